//! CLI entry point for the TfL Pulse tool.
//!
//! Provides subcommands for the network summary, disruption alerts, the bus
//! table, station map markers, the journey planner and a polling loop that
//! refreshes the summary on an interval.

mod infra;
mod services;

use crate::infra::tfl::client::TflClient;
use crate::services::transit_api::TransitApi;
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::ffi::OsStr;
use std::path::Path;
use tfl_pulse::analysis::impact::severity_map;
use tfl_pulse::analysis::summary::{
    MarkerStyle, ModeBreakdown, bus_table, disruption_by_mode, find_station, format_clock,
    marker_style, mode_summary, search_bus_routes, selected_statuses, severity_summary, tone,
};
use tfl_pulse::analysis::{NetworkImpact, NetworkKpis, RankCriteria, aggregate, filter, rank_candidates};
use tfl_pulse::config::Settings;
use tfl_pulse::model::Severity;
use tfl_pulse::output::{print_json, print_pretty, write_table};
use tracing::Instrument;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "tfl_pulse")]
#[command(about = "Live Transport for London status, disruptions and journeys", long_about = None)]
struct Cli {
    /// Optional JSON settings file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Network KPIs, per-severity line counts and disruption by mode
    Summary {
        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Disruption alerts for selected lines and bus routes
    Alerts {
        /// Line or route id to include (repeatable; none means all)
        #[arg(short, long = "line", value_name = "ID")]
        lines: Vec<String>,

        /// Lowest severity to report
        #[arg(short, long, value_enum, default_value_t = MinSeverity::Good)]
        min_severity: MinSeverity,

        /// CSV file to write the filtered line statuses to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Bus route status table
    Buses {
        /// Only show routes whose id contains this text
        #[arg(short, long)]
        route: Option<String>,

        /// Lowest severity to report
        #[arg(short, long, value_enum, default_value_t = MinSeverity::Good)]
        min_severity: MinSeverity,

        /// CSV file to write the table to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Station impacts as map markers
    Stations {
        /// Print station impacts and markers as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Plan a journey between two stations by name
    Journey {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Order equally long journeys by fewest changes
        #[arg(long, default_value_t = false)]
        prefer_fewer_changes: bool,

        /// Print ranked and rejected options as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Refresh the summary on an interval
    Watch {
        /// Seconds between refreshes
        #[arg(short, long, default_value_t = 300)]
        interval: u64,

        /// Number of refreshes (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        cycles: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MinSeverity {
    Good,
    Minor,
    Severe,
    PartClosure,
    Suspended,
    Unknown,
}

impl From<MinSeverity> for Severity {
    fn from(value: MinSeverity) -> Self {
        match value {
            MinSeverity::Good => Severity::GoodService,
            MinSeverity::Minor => Severity::MinorDelays,
            MinSeverity::Severe => Severity::SevereDelays,
            MinSeverity::PartClosure => Severity::PartClosure,
            MinSeverity::Suspended => Severity::Suspended,
            MinSeverity::Unknown => Severity::Unknown,
        }
    }
}

#[derive(Serialize)]
struct SummaryReport {
    kpis: NetworkKpis,
    lines_by_severity: BTreeMap<Severity, usize>,
    disrupted_by_mode: ModeBreakdown,
}

#[derive(Serialize)]
struct StationsReport<'a> {
    impact: &'a NetworkImpact,
    markers: &'a [MarkerStyle],
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/tfl_pulse.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("tfl_pulse.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .with_env()?;

    if settings.app_key.is_none() {
        warn!("TFL_KEY not set, using anonymous rate limits");
    }

    let api = TflClient::new(&settings)?;

    match cli.command {
        Commands::Summary { json } => summary(&api, &settings, json).await?,
        Commands::Alerts {
            lines,
            min_severity,
            output,
        } => alerts(&api, &settings, lines, min_severity.into(), output).await?,
        Commands::Buses {
            route,
            min_severity,
            output,
        } => buses(&api, route, min_severity.into(), output).await?,
        Commands::Stations { json } => stations(&api, &settings, json).await?,
        Commands::Journey {
            from,
            to,
            prefer_fewer_changes,
            json,
        } => journey(&api, &settings, &from, &to, prefer_fewer_changes, json).await?,
        Commands::Watch { interval, cycles } => watch(&api, &settings, interval, cycles).await?,
    }

    Ok(())
}

/// Fetches line statuses and stations, then logs the network KPIs.
#[tracing::instrument(skip(api, settings))]
async fn summary(api: &impl TransitApi, settings: &Settings, json: bool) -> Result<()> {
    let (lines, stations) = tokio::try_join!(
        api.line_statuses(&settings.line_modes),
        api.stations(&settings.station_mode),
    )?;

    let impact = aggregate(&stations, &severity_map(&lines));
    let report = SummaryReport {
        kpis: impact.kpis,
        lines_by_severity: severity_summary(&lines),
        disrupted_by_mode: disruption_by_mode(&lines, &settings.tube_line_set()),
    };

    if json {
        return print_json(&report);
    }

    let kpis = &report.kpis;
    info!(
        stations = kpis.total_stations,
        affected = kpis.affected_stations,
        percent_impacted = kpis.percent_impacted,
        "Station impact"
    );
    info!(
        lines = kpis.total_lines,
        disrupted = kpis.disrupted_line_count,
        percent_disrupted = kpis.percent_disrupted_lines,
        "Line impact"
    );
    for (severity, count) in &report.lines_by_severity {
        info!(severity = %severity, count, "Lines by status");
    }
    info!(
        tube = report.disrupted_by_mode.tube,
        other = report.disrupted_by_mode.other,
        "Disrupted lines by mode"
    );

    Ok(())
}

#[tracing::instrument(skip(api, settings))]
async fn alerts(
    api: &impl TransitApi,
    settings: &Settings,
    lines: Vec<String>,
    min_severity: Severity,
    output: Option<String>,
) -> Result<()> {
    let (line_statuses, bus_statuses) = tokio::try_join!(
        api.line_statuses(&settings.line_modes),
        api.bus_disruptions(),
    )?;

    // Selected lines are reported whatever their severity.
    for (id, status) in selected_statuses(&line_statuses, &lines) {
        match status {
            Some(line) => info!(
                line = %line.line_name,
                status = %line.severity,
                tone = ?tone(line.severity),
                "Selected line"
            ),
            None if bus_statuses.iter().any(|bus| bus.route_id == id) => {}
            None => warn!(id, "Selected id matches no line or bus route"),
        }
    }

    let selected: HashSet<String> = lines.into_iter().collect();
    let filtered = filter(&line_statuses, &bus_statuses, &selected, min_severity);

    let mut any_alert = false;
    for line in filtered.alerts() {
        any_alert = true;
        warn!(
            line = %line.line_name,
            status = %line.severity,
            reason = line.disruption_reason.as_deref().unwrap_or(""),
            "Disruption alert"
        );
    }
    if !any_alert {
        info!("All selected lines are running with Good Service");
    }

    let disrupted_buses = filtered
        .buses
        .iter()
        .filter(|bus| bus.severity.is_disrupted())
        .count();
    info!(routes = filtered.buses.len(), disrupted = disrupted_buses, "Bus routes matched");

    if let Some(path) = output {
        write_table(&path, &filtered.lines)?;
        info!(path = %path, rows = filtered.lines.len(), "Line statuses written");
    }

    Ok(())
}

#[tracing::instrument(skip(api))]
async fn buses(
    api: &impl TransitApi,
    route: Option<String>,
    min_severity: Severity,
    output: Option<String>,
) -> Result<()> {
    let all = api.bus_disruptions().await?;
    let buses = filter(&[], &all, &HashSet::new(), min_severity).buses;

    let matched: Vec<_> = match route.as_deref() {
        Some(query) => search_bus_routes(&buses, query).into_iter().cloned().collect(),
        None => buses,
    };

    if matched.is_empty() {
        info!("No bus routes found matching your search");
        return Ok(());
    }

    let table = bus_table(&matched);
    for bus in &table {
        info!(
            route = %bus.route_id,
            status = %bus.severity,
            description = %bus.description,
            "Bus route"
        );
    }

    if let Some(path) = output {
        write_table(&path, &table)?;
        info!(path = %path, rows = table.len(), "Bus table written");
    }

    Ok(())
}

#[tracing::instrument(skip(api, settings))]
async fn stations(api: &impl TransitApi, settings: &Settings, json: bool) -> Result<()> {
    let (lines, stations) = tokio::try_join!(
        api.line_statuses(&settings.line_modes),
        api.stations(&settings.station_mode),
    )?;

    let impact = aggregate(&stations, &severity_map(&lines));
    let markers: Vec<_> = stations
        .iter()
        .filter_map(|station| {
            let station_impact = impact.station(&station.station_id)?;
            marker_style(station, station_impact)
        })
        .collect();

    if json {
        return print_json(&StationsReport {
            impact: &impact,
            markers: &markers,
        });
    }

    for marker in &markers {
        debug!(station = %marker.name, color = marker.color, radius = marker.radius, "Marker");
    }
    for station_impact in impact.stations.values().filter(|i| i.worst_severity.is_disrupted()) {
        print_pretty(station_impact);
    }
    info!(
        markers = markers.len(),
        affected = impact.kpis.affected_stations,
        "Station map ready"
    );

    Ok(())
}

#[tracing::instrument(skip(api, settings))]
async fn journey(
    api: &impl TransitApi,
    settings: &Settings,
    from: &str,
    to: &str,
    prefer_fewer_changes: bool,
    json: bool,
) -> Result<()> {
    let stations = api.stations(&settings.station_mode).await?;

    let start = find_station(&stations, from).ok_or_else(|| anyhow!("no station named '{from}'"))?;
    let end = find_station(&stations, to).ok_or_else(|| anyhow!("no station named '{to}'"))?;

    if start.station_id == end.station_id {
        info!("Start and end stations are the same");
        return Ok(());
    }

    let candidates = api.journeys(&start.station_id, &end.station_id).await?;
    let outcome = rank_candidates(
        candidates,
        RankCriteria {
            prefer_fewer_changes,
        },
    );

    if json {
        return print_json(&outcome);
    }

    for rejected in &outcome.rejected {
        warn!(candidate = rejected.index, reason = %rejected.reason, "Journey option rejected");
    }

    if outcome.ranked.is_empty() {
        info!("No journeys found for these stations");
        return Ok(());
    }

    for (i, option) in outcome.ranked.iter().enumerate() {
        info!(
            option = i + 1,
            minutes = option.total_duration_minutes(),
            changes = option.change_count(),
            "Journey option"
        );
        for leg in option.legs() {
            let name = match &leg.line_name {
                Some(line) => format!("{} {}", leg.mode, line),
                None => leg.mode.to_string(),
            };
            info!(
                leg = %name,
                from = %leg.from_stop,
                to = %leg.to_stop,
                depart = %format_clock(leg.departure),
                arrive = %format_clock(leg.arrival),
                disruption = leg.disruption.as_deref().unwrap_or(""),
                "Leg"
            );
        }
        let modes = mode_summary(option)
            .iter()
            .map(|(mode, minutes)| format!("{mode}: {minutes} min"))
            .collect::<Vec<_>>()
            .join(" | ");
        info!(summary = %modes, "Mode summary");
    }

    Ok(())
}

/// Re-runs the summary every `interval` seconds. A failed refresh is logged
/// and the loop carries on.
#[tracing::instrument(skip(api, settings))]
async fn watch(api: &impl TransitApi, settings: &Settings, interval: u64, cycles: usize) -> Result<()> {
    if cycles == 0 {
        info!(interval, "Refreshing indefinitely. Press Ctrl+C to stop.");
    }

    let mut cycle = 0;
    loop {
        if cycles > 0 && cycle >= cycles {
            break;
        }
        cycle += 1;

        let span = tracing::info_span!("refresh", cycle);
        if let Err(e) = summary(api, settings, false).instrument(span).await {
            error!(cycle, error = %e, "Refresh failed");
        }

        if cycles == 0 || cycle < cycles {
            tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
        }
    }

    info!(cycles = cycle, "Finished refreshing");
    Ok(())
}
