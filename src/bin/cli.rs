use std::fs::File;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use clap::builder::styling::Styles;
use clap::{Args, ColorChoice, Parser, Subcommand, crate_version};
use clap_cargo::style::{ERROR, HEADER, INVALID, LITERAL, PLACEHOLDER, USAGE, VALID};
use marscoord::internal::report::{
    DEMO_POINT, Precision, demo_report, forward_report, inverse_report,
};
use marscoord::{Gcj02Point, Wgs84Point, is_outside_china};
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug, info, instrument, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry, fmt};

pub const CLAP_STYLING: Styles = Styles::styled()
    .header(HEADER)
    .usage(USAGE)
    .literal(LITERAL)
    .placeholder(PLACEHOLDER)
    .error(ERROR)
    .valid(VALID)
    .invalid(INVALID);

static LONG_VERSION: LazyLock<String> =
    LazyLock::new(|| format!("{} (rustc {})", crate_version!(), env!("RUSTC_VERSION")));

/// Convert coordinates between WGS-84 and GCJ-02
///
/// GCJ-02 ("Mars coordinates") is the obfuscated datum used by maps published
/// in mainland China. Outside China the two datums are identical.
///
/// Coordinates are given as a single LON,LAT argument in decimal degrees.
#[derive(Parser)]
#[command(
    name = "marscoord",
    version,
    long_version = LONG_VERSION.as_str(),
    about,
    color = ColorChoice::Auto,
    styles = CLAP_STYLING,
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// Configure diagnostic logging level
    ///
    /// Set to DEBUG to see a performance summary following execution.
    #[clap(long, short = 'L', default_value_t = Level::ERROR)]
    log_level: Level,

    /// Log to a file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// Number of decimal places to print
    ///
    /// If unspecified, prints the shortest representation that round-trips
    /// to the same double-precision value.
    #[clap(long, short)]
    precision: Option<usize>,
}

impl Cli {
    fn precision(&self) -> Precision {
        match self.precision {
            Some(p) => Precision::Places(p),
            None => Precision::Exact,
        }
    }
}

#[derive(Args, Debug)]
struct ToGcj02Args {
    /// WGS-84 coordinate as LON,LAT
    #[clap(allow_hyphen_values = true)]
    point: Wgs84Point,
}

#[derive(Args, Debug)]
struct ToWgs84Args {
    /// GCJ-02 coordinate as LON,LAT
    #[clap(allow_hyphen_values = true)]
    point: Gcj02Point,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// WGS-84 coordinate as LON,LAT
    ///
    /// Defaults to Tian'anmen, Beijing.
    #[clap(allow_hyphen_values = true)]
    point: Option<Wgs84Point>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a WGS-84 (GPS) coordinate to GCJ-02
    ToGcj02(ToGcj02Args),

    /// Convert a GCJ-02 coordinate back to WGS-84
    ///
    /// The inverse has no closed form and is approximated by iterating the
    /// forward transform, which is accurate to well under a millimeter inside
    /// China.
    ToWgs84(ToWgs84Args),

    /// Show a point, its GCJ-02 counterpart, their offset, and the round trip
    Demo(DemoArgs),
}

fn warn_if_outside(lon: marscoord::Degrees<f64>, lat: marscoord::Degrees<f64>) {
    if is_outside_china(lon, lat) {
        warn!(
            "{},{} is outside the China bounding box; the transform is the identity",
            lon.0, lat.0
        );
    }
}

#[instrument(level = "trace", skip_all)]
fn to_gcj02_cmd(args: &Cli, sub_args: &ToGcj02Args) -> Result<String> {
    debug!("to-gcj02 args: {:?}", sub_args);
    let p = sub_args.point;
    if !p.lon().0.is_finite() || !p.lat().0.is_finite() {
        bail!("Coordinates must be finite numbers");
    }
    warn_if_outside(p.lon(), p.lat());
    forward_report(p, args.precision()).context("Formatting the GCJ-02 coordinate")
}

#[instrument(level = "trace", skip_all)]
fn to_wgs84_cmd(args: &Cli, sub_args: &ToWgs84Args) -> Result<String> {
    debug!("to-wgs84 args: {:?}", sub_args);
    let p = sub_args.point;
    if !p.lon().0.is_finite() || !p.lat().0.is_finite() {
        bail!("Coordinates must be finite numbers");
    }
    warn_if_outside(p.lon(), p.lat());
    inverse_report(p, args.precision()).context("Formatting the WGS-84 coordinate")
}

#[instrument(level = "trace", skip_all)]
fn demo_cmd(args: &Cli, sub_args: &DemoArgs) -> Result<String> {
    debug!("demo args: {:?}", sub_args);
    let p = sub_args.point.unwrap_or(DEMO_POINT);
    info!("Demonstrating transforms at {}", p);
    demo_report(p, args.precision()).context("Formatting the demo report")
}

fn main() -> Result<()> {
    // Intentionally avoid wrapping argument parsing errors in anyhow::Result so
    // we preserve Clap's pretty formatting of usage info.
    let args = Cli::parse();

    let log_w: Box<dyn std::io::Write + Send> = match &args.log_file {
        Some(path) => Box::new(File::create(path).context("Creating the log file")?),
        None => Box::new(std::io::stderr()),
    };
    let (appender, _guard) = tracing_appender::non_blocking(log_w);

    // Enable the TRACE-level span tree layer for fmt logging level DEBUG.
    let fmt_layer = fmt::Layer::new()
        .with_writer(appender)
        .with_ansi(args.log_file.is_none())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
        .with_filter(LevelFilter::from_level(args.log_level));
    if args.log_level >= Level::DEBUG {
        let span_tree_layer = tracing_span_tree::SpanTree::default().aggregate(true);
        tracing::subscriber::set_global_default(
            Registry::default().with(fmt_layer).with(span_tree_layer),
        )?;
    } else {
        tracing::subscriber::set_global_default(Registry::default().with(fmt_layer))?;
    }

    debug!("marscoord {}", clap::crate_version!());

    let report = match &args.cmd {
        Commands::ToGcj02(sub_args) => to_gcj02_cmd(&args, sub_args),
        Commands::ToWgs84(sub_args) => to_wgs84_cmd(&args, sub_args),
        Commands::Demo(sub_args) => demo_cmd(&args, sub_args),
    }?;

    print!("{report}");
    Ok(())
}
