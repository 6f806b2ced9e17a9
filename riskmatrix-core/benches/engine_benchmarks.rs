use criterion::{Criterion, black_box, criterion_group, criterion_main};
use riskmatrix_core::{
    CauseInput, ComparisonSummary, ControlInput, GridCoordinateResolver, MatrixKind,
    MitigationMode, Rating, RiskInput, RiskScoringEngine,
};

fn sample_control() -> ControlInput {
    serde_json::from_str(
        r#"{"tieneControl": true, "desviaciones": "B", "aplicabilidad": "totalmente",
            "cobertura": "significativa", "facilidadUso": "facil", "segregacion": "si",
            "naturaleza": "Semiautomático"}"#,
    )
    .unwrap()
}

fn sample_risk(causes: usize) -> RiskInput {
    let causas = (0..causes)
        .map(|n| {
            let f = Rating::new((n % 5) as u8 + 1).unwrap();
            let i = Rating::new(((n * 3) % 5) as u8 + 1).unwrap();
            let cause = CauseInput::new(f, i);
            if n % 2 == 0 {
                cause.with_control(sample_control(), MitigationMode::Both)
            } else {
                cause
            }
        })
        .collect();
    RiskInput {
        causas,
        ..Default::default()
    }
}

fn bench_grid_resolver(c: &mut Criterion) {
    c.bench_function("resolve_exact_cell", |b| {
        b.iter(|| GridCoordinateResolver::resolve(black_box(12.0)))
    });

    c.bench_function("resolve_fractional", |b| {
        b.iter(|| GridCoordinateResolver::resolve(black_box(7.3)))
    });

    c.bench_function("resolve_above_grid", |b| {
        b.iter(|| GridCoordinateResolver::resolve(black_box(31.0)))
    });
}

fn bench_risk_evaluation(c: &mut Criterion) {
    let engine = RiskScoringEngine::default();

    let single = sample_risk(1);
    c.bench_function("evaluate_risk_single_cause", |b| {
        b.iter(|| engine.evaluate_risk(black_box(&single)))
    });

    let many = sample_risk(20);
    c.bench_function("evaluate_risk_20_causes", |b| {
        b.iter(|| engine.evaluate_risk(black_box(&many)))
    });
}

fn bench_matrix_and_comparison(c: &mut Criterion) {
    let engine = RiskScoringEngine::default();

    c.bench_function("render_residual_matrix", |b| {
        b.iter(|| engine.matrix(black_box(MatrixKind::Residual)))
    });

    let points: Vec<_> = (0..200)
        .filter_map(|n| engine.evaluate_risk(&sample_risk(n % 6 + 1)).ok())
        .enumerate()
        .map(|(n, eval)| eval.to_point(format!("R{n}")))
        .collect();
    c.bench_function("comparison_summary_200", |b| {
        b.iter(|| ComparisonSummary::build(black_box(&points)))
    });
}

criterion_group!(
    benches,
    bench_grid_resolver,
    bench_risk_evaluation,
    bench_matrix_and_comparison
);
criterion_main!(benches);
