use std::path::Path;

use canegap_core::pipeline::{PipelineConfig, SegmentOutput};
use canegap_core::segmentation::SegmentationConfig;
use console::Style;

use crate::commands::run::FileOutcome;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warning: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            warning: Style::new().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn rule(s: &Styles, width: usize) {
    println!("  {}", s.title.apply_to("\u{2550}".repeat(width)));
}

pub fn print_segment_summary(
    input: &Path,
    config: &SegmentationConfig,
    output: &SegmentOutput,
    mask_path: &Path,
) {
    let s = Styles::new();
    let (w, h) = output.map.dimensions();

    println!();
    println!("  {}", s.title.apply_to("Segmentation"));
    rule(&s, 12);
    println!();
    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(input.display()));
    println!("  {:<14}{}", s.label.apply_to("Size"), s.value.apply_to(format!("{w} x {h}")));
    println!("  {:<14}{}", s.label.apply_to("Index"), s.method.apply_to(config.index));
    println!(
        "  {:<14}{} {}",
        s.label.apply_to("Threshold"),
        s.method.apply_to(&config.threshold_method),
        s.value.apply_to(format!("({:.3})", output.threshold))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Connectivity"),
        s.method.apply_to(config.connectivity)
    );
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Components"),
        s.value.apply_to(output.components.len())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Foreground"),
        s.value.apply_to(format!(
            "{:.1}%",
            100.0 * output.map.foreground_pixels() as f64 / (w * h).max(1) as f64
        ))
    );
    println!("  {:<14}{}", s.label.apply_to("Mask"), s.path.apply_to(mask_path.display()));
    println!();
}

pub fn print_run_summary(outcome: &FileOutcome, config: &PipelineConfig) {
    let s = Styles::new();
    let m = &outcome.metrics;

    println!();
    println!("  {}", s.title.apply_to(outcome.input.display()));
    rule(&s, 16);
    println!();

    println!("  {}", s.header.apply_to("Segmentation"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Components"),
        s.value.apply_to(outcome.components)
    );
    println!(
        "    {:<14}{} {}",
        s.label.apply_to("Threshold"),
        s.method.apply_to(&config.segmentation.threshold_method),
        s.value.apply_to(format!("({:.3})", outcome.threshold))
    );
    println!();

    println!("  {}", s.header.apply_to("Rows"));
    println!("    {:<14}{}", s.label.apply_to("Rows"), s.value.apply_to(outcome.rows));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Row length"),
        s.value.apply_to(format!("{:.1} px", m.total_row_length_px))
    );
    println!("    {:<14}{}", s.label.apply_to("Gaps"), s.value.apply_to(m.gap_count));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Gap length"),
        s.value.apply_to(format!("{:.1} px", m.total_gap_length_px))
    );
    println!();

    println!("  {}", s.header.apply_to("Failure"));
    if m.insufficient_data {
        println!(
            "    {:<14}{}",
            s.label.apply_to("Result"),
            s.warning.apply_to("insufficient data (no measurable row)")
        );
    } else {
        println!(
            "    {:<14}{}",
            s.label.apply_to("Percentage"),
            s.value.apply_to(format!("{:.2}%", m.percentage))
        );
        println!(
            "    {:<14}{}",
            s.label.apply_to("Length"),
            s.value.apply_to(format!("{:.2} m", m.meters))
        );
    }
    println!(
        "    {:<14}{}",
        s.label.apply_to("Scale"),
        s.method.apply_to(config.process.metrics.scale_reference)
    );
    match m.reference_px {
        Some(px) => println!(
            "    {:<14}{}",
            s.label.apply_to("Reference"),
            s.value.apply_to(format!("{px:.1} px ({:.4} m/px)", m.meters_per_pixel))
        ),
        None => println!(
            "    {:<14}{}",
            s.label.apply_to("Reference"),
            s.warning.apply_to("unavailable")
        ),
    }
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Overlay"),
        s.path.apply_to(outcome.overlay.display())
    );
    if let Some(ref report) = outcome.report {
        println!("  {:<14}{}", s.label.apply_to("Report"), s.path.apply_to(report.display()));
    }
    println!();
}

pub fn print_batch_footer(total: usize, failed: usize) {
    if total < 2 {
        return;
    }
    let s = Styles::new();
    let done = total - failed;
    if failed == 0 {
        println!("  {}", s.method.apply_to(format!("{done} image(s) processed")));
    } else {
        println!(
            "  {} {}",
            s.method.apply_to(format!("{done} image(s) processed,")),
            s.warning.apply_to(format!("{failed} failed"))
        );
    }
}
