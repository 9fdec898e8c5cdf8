//! Chart rendering collaborator.

use super::{ChartKind, ChartSpec};
use serde::Serialize;
use tracing::warn;

/// Draws a chart spec into embeddable markup.
///
/// Any `Fn(&ChartSpec) -> anyhow::Result<String>` closure is a renderer.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, spec: &ChartSpec) -> anyhow::Result<String>;
}

impl<F> ChartRenderer for F
where
    F: Fn(&ChartSpec) -> anyhow::Result<String> + Send + Sync,
{
    fn render(&self, spec: &ChartSpec) -> anyhow::Result<String> {
        self(spec)
    }
}

/// A successfully rendered chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedChart {
    pub name: String,
    pub kind: ChartKind,
    pub title: String,
    pub markup: String,
}

/// A chart the renderer could not draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartFailure {
    pub name: String,
    pub error: String,
}

/// Rendered charts plus the specs that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisualizationResult {
    pub charts: Vec<RenderedChart>,
    pub failures: Vec<ChartFailure>,
}

impl VisualizationResult {
    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

/// Render every spec, continuing past failures.
pub fn render_charts(renderer: &dyn ChartRenderer, specs: &[ChartSpec]) -> VisualizationResult {
    let mut result = VisualizationResult::default();

    for spec in specs {
        match renderer.render(spec) {
            Ok(markup) => result.charts.push(RenderedChart {
                name: spec.name.clone(),
                kind: spec.kind,
                title: spec.title.clone(),
                markup,
            }),
            Err(e) => {
                warn!("Failed to render chart '{}': {:#}", spec.name, e);
                result.failures.push(ChartFailure {
                    name: spec.name.clone(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, kind: ChartKind) -> ChartSpec {
        ChartSpec {
            name: name.to_string(),
            kind,
            columns: vec!["x".to_string()],
            title: format!("Chart {}", name),
            top_n: None,
        }
    }

    #[test]
    fn test_failures_do_not_block_other_charts() {
        let renderer = |spec: &ChartSpec| -> anyhow::Result<String> {
            if spec.kind == ChartKind::BoxPlot {
                anyhow::bail!("box plots unsupported")
            }
            Ok(format!("<div>{}</div>", spec.name))
        };
        let specs = vec![
            spec("histogram", ChartKind::Histogram),
            spec("boxplot", ChartKind::BoxPlot),
            spec("scatter", ChartKind::ScatterPlot),
        ];

        let result = render_charts(&renderer, &specs);

        assert_eq!(result.charts.len(), 2);
        assert_eq!(result.charts[0].markup, "<div>histogram</div>");
        assert_eq!(result.charts[1].name, "scatter");
        assert_eq!(
            result.failures,
            vec![ChartFailure {
                name: "boxplot".to_string(),
                error: "box plots unsupported".to_string(),
            }]
        );
    }

    #[test]
    fn test_all_failing_is_empty() {
        let renderer = |_: &ChartSpec| -> anyhow::Result<String> { anyhow::bail!("offline") };
        let result = render_charts(&renderer, &[spec("histogram", ChartKind::Histogram)]);
        assert!(result.is_empty());
        assert_eq!(result.failures.len(), 1);
    }
}
