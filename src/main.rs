use std::time::Duration;

use anyhow::{Context as _, bail};
use gpui::{
    App, AppContext, Application, AsyncWindowContext, Bounds, Entity, Timer, Window,
    WindowBounds, WindowOptions, px, size,
};
use tracing_subscriber::EnvFilter;

use gpui_streamdash::config::THEME_ENV;
use gpui_streamdash::{
    ChartViewConfig, GpuiChartView, GpuiDashboardView, PipelineConfig, ProgressiveDashboard,
    StreamHandle,
};

const REPAINT_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Default)]
struct Args {
    theme: Option<String>,
    config: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--theme" => args.theme = Some(iter.next().context("--theme needs a name")?),
            "--config" => args.config = Some(iter.next().context("--config needs a path")?),
            other => bail!("unknown argument `{other}`; usage: streamdash [--theme NAME] [--config PATH]"),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load configuration from {path}"))?,
        None => PipelineConfig::default(),
    };
    let env_theme = std::env::var(THEME_ENV).ok();
    let theme = config.resolve_theme(args.theme.as_deref(), env_theme.as_deref());
    tracing::info!(theme = theme.name, "starting streamdash");

    let pipeline =
        ProgressiveDashboard::build(&config, theme).context("failed to assemble dashboard")?;
    let streams = pipeline.start().context("failed to start data streams")?;

    Application::new().run(move |cx: &mut App| {
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(1280.0), px(720.0)),
                cx,
            ))),
            ..Default::default()
        };
        let opened = cx.open_window(options, move |window, cx| {
            let view = cx.new(|cx| {
                GpuiDashboardView::new(pipeline.dashboard(), ChartViewConfig::default(), cx)
            });
            let charts: Vec<Entity<GpuiChartView>> =
                view.read(cx).chart_views().cloned().collect();
            spawn_repaint(window, cx, charts, streams);
            view
        });
        if let Err(error) = opened {
            tracing::error!(%error, "failed to open window");
            cx.quit();
        }
    });
    Ok(())
}

/// Repaint the charts while the window lives; producers stop with it.
fn spawn_repaint(
    window: &mut Window,
    cx: &mut App,
    charts: Vec<Entity<GpuiChartView>>,
    streams: Vec<StreamHandle>,
) {
    window
        .spawn(cx, move |cx: &mut AsyncWindowContext| {
            let mut cx = cx.clone();
            async move {
                let _streams = streams;
                loop {
                    Timer::after(REPAINT_INTERVAL).await;
                    let updated = cx.update(|_, cx| {
                        for chart in &charts {
                            chart.update(cx, |_view, vcx| vcx.notify());
                        }
                    });
                    if updated.is_err() {
                        break;
                    }
                }
            }
        })
        .detach();
}
