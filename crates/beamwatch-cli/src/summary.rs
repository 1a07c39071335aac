use console::Style;
use beamwatch_core::config::MonitorConfig;
use beamwatch_core::MonitorStatus;

use crate::commands::monitor::MonitorReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    good: Style,
    warn: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            good: Style::new().green(),
            warn: Style::new().red().bold(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_monitor_summary(config: &MonitorConfig, refresh: &str) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Beamwatch Monitor"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(17)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Source"),
        s.path.apply_to(&config.source)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Capture"),
        s.value.apply_to(format!("{}x{}", config.width, config.height))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Refresh"),
        s.value.apply_to(refresh)
    );
    println!();

    let a = &config.alignment;
    println!("  {}", s.header.apply_to("Alignment"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Target"),
        s.good.apply_to(&a.mode)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Peak ratio"),
        s.value.apply_to(format!("> {:.2}", a.secondary_peak_ratio))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Separation"),
        s.value.apply_to(format!("> {:.1} px", a.misalignment_distance))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Noise floor"),
        s.value.apply_to(format!("{:.1}", a.noise_floor))
    );
    println!();
}

pub fn print_monitor_report(report: &MonitorReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Session"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Ticks"),
        s.value.apply_to(report.ticks)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(report.frames)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Aligned"),
        s.good.apply_to(report.aligned)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Misaligned"),
        s.warn.apply_to(report.misaligned)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("No signal"),
        s.value.apply_to(report.waiting)
    );
    if report.snapshots > 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Snapshots"),
            s.value.apply_to(report.snapshots)
        );
    }

    let last = match &report.last_status {
        MonitorStatus::Aligned => s.good.apply_to(report.last_status.to_string()),
        MonitorStatus::Misaligned | MonitorStatus::Error(_) => {
            s.warn.apply_to(report.last_status.to_string())
        }
        other => s.value.apply_to(other.to_string()),
    };
    println!("    {:<12}{}", s.label.apply_to("Last status"), last);
    println!();
}
