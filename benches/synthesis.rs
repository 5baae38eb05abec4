//! Benchmarks for naming, synthesis and a full controller round trip

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use k8s_openapi::api::apps::v1::Deployment;
use std::sync::Arc;
use tenant_provisioner::projection::project_deployment;
use tenant_provisioner::synthesis::synthesize_deployment;
use tenant_provisioner::{
    BuiltinTemplateStore, DeploymentModel, EnvVarModel, InMemoryCluster, NameResolver,
    Provisioner, ResourceKind, TenancyKey, TenantScopedNames,
};

fn request() -> DeploymentModel {
    DeploymentModel {
        replicas: Some(3),
        image: Some("nginx:1.25".into()),
        ports: vec![8080, 8443],
        env: (0..8)
            .map(|i| EnvVarModel::new(format!("VAR_{}", i), "value"))
            .collect(),
        ..Default::default()
    }
}

fn bench_naming(c: &mut Criterion) {
    let mut group = c.benchmark_group("naming");
    group.throughput(Throughput::Elements(1));

    let names = TenantScopedNames::new();
    let key = TenancyKey::new(Some("teamA"), "acme", "web").unwrap();

    group.bench_function("deployment_names", |b| {
        b.iter(|| names.deployment_names(black_box(&key)));
    });

    group.finish();
}

fn bench_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesis");
    group.throughput(Throughput::Elements(1));

    let template: Deployment =
        serde_json::from_value(BuiltinTemplateStore::template(ResourceKind::Deployment).unwrap())
            .unwrap();
    let key = TenancyKey::new(Some("teamA"), "acme", "web").unwrap();
    let names = TenantScopedNames::new().deployment_names(&key);
    let request = request();

    group.bench_function("synthesize_deployment", |b| {
        b.iter(|| synthesize_deployment(black_box(&template), &names, black_box(&request)));
    });

    let manifest = synthesize_deployment(&template, &names, &request).unwrap();
    group.bench_function("project_deployment", |b| {
        b.iter(|| project_deployment(black_box(&manifest)));
    });

    group.finish();
}

fn bench_controller_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller");
    group.throughput(Throughput::Elements(1));

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let provisioner = Provisioner::new(
        Arc::new(InMemoryCluster::new()),
        Arc::new(BuiltinTemplateStore),
    );
    runtime.block_on(async {
        let _ = provisioner.namespaces().create("acme").await;
    });

    let request = request();
    let mut counter = 0u64;

    group.bench_function("create_and_delete_deployment", |b| {
        b.iter(|| {
            counter += 1;
            let name = format!("web-{}", counter);
            runtime.block_on(async {
                let key = TenancyKey::new(Some("teamA"), "acme", &name).unwrap();
                let _ = provisioner.deployments().create(&key, &request).await;
                let _ = provisioner.deployments().delete(&key).await;
            });
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_naming,
    bench_synthesis,
    bench_controller_round_trip
);
criterion_main!(benches);
