use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mathtext_render::{FixedMetrics, Renderer, RendererConfig};

const SIMPLE: &str = "E=mc^2";
const COMPLEX: &str = r"P_{bid} = \min\left(\max\left(P_{s} \times \left(1 - \alpha \cdot \frac{P_{s} - P_{m}}{P_{s}+P_{m}}\right), \sqrt[3]{\sum_{i=1}^{n} x_i^2}\right), \begin{pmatrix}a & b \\ c & d\end{pmatrix}\right)";

fn math_config() -> RendererConfig {
    RendererConfig {
        start_in_math_mode: true,
        ..RendererConfig::default()
    }
}

/// 解析加测量，使用确定性度量排除字体的影响
fn parse_and_measure_benchmark(c: &mut Criterion) {
    c.bench_function("parse_measure_complex", |b| {
        b.iter(|| {
            let mut renderer = Renderer::with_metrics(Box::new(FixedMetrics), math_config());
            renderer.parse(black_box(COMPLEX));
            black_box(renderer.measure(&renderer.environment()))
        });
    });
}

/// 完整的 SVG 渲染流程
fn render_svg_benchmark(c: &mut Criterion) {
    c.bench_function("render_simple_formula", |b| {
        b.iter(|| {
            let result = mathtext_render::render_svg(black_box(SIMPLE));
            assert!(result.is_ok(), "简单公式渲染应当成功");
        });
    });

    c.bench_function("render_complex_formula", |b| {
        b.iter(|| {
            let result = mathtext_render::render_svg(black_box(COMPLEX));
            assert!(result.is_ok(), "复杂公式渲染应当成功");
        });
    });
}

criterion_group!(benches, parse_and_measure_benchmark, render_svg_benchmark);
criterion_main!(benches);
