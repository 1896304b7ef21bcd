use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;

use curbroute::kd::KDTree;
use curbroute::osm::reader;
use curbroute::{generate_route, gpx, report, Config};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct NetworkLoadError(PathBuf, #[source] reader::Error);

/// Generates a closed collection route driving both curbs of every
/// driveable street in an OSM extract.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// The path to the OSM file (.osm, .osm.gz or .osm.bz2)
    osm_file: PathBuf,

    /// Where to write the GPX track
    #[arg(long, default_value = "route.gpx")]
    out: PathBuf,

    /// Where to write the Markdown report, if anywhere
    #[arg(long)]
    report: Option<PathBuf>,

    /// Start/end the circuit at this OSM node
    #[arg(long, conflicts_with_all = ["start_lat", "start_lon"])]
    start_node: Option<i64>,

    /// Snap the circuit start to this latitude (requires --start-lon)
    #[arg(long, requires = "start_lon")]
    start_lat: Option<f64>,

    /// Snap the circuit start to this longitude (requires --start-lat)
    #[arg(long, requires = "start_lat")]
    start_lon: Option<f64>,

    /// Average speed (km/h) used for the drive-time estimate
    #[arg(long, default_value_t = 30.0)]
    speed: f64,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let data = reader::read_from_file(&cli.osm_file)
        .map_err(|e| NetworkLoadError(cli.osm_file.clone(), e))?;

    let mut config = Config::default();
    config.average_speed_kmh = cli.speed;
    config.start_node_id = cli.start_node;

    if let (Some(lat), Some(lon)) = (cli.start_lat, cli.start_lon) {
        let tree = KDTree::from_iter(data.nodes.values().copied())
            .ok_or("no nodes to snap the start position to")?;
        let nearest = tree.find_nearest_node(lat, lon);
        log::info!("snapped start position to node {}", nearest.id);
        config.start_node_id = Some(nearest.id);
    }

    let result = generate_route(&data.nodes, &data.ways, &config)?;

    let track_name = cli
        .osm_file
        .file_stem()
        .map(|s| format!("Collection route: {}", s.to_string_lossy()))
        .unwrap_or_else(|| "Collection route".to_string());
    let desc = "Every driveable street twice, once per direction, right turns preferred";

    let mut gpx_out = BufWriter::new(File::create(&cli.out)?);
    gpx::write_track(&mut gpx_out, &track_name, desc, &result.waypoints)?;
    gpx_out.flush()?;
    println!("{}: {} waypoints", cli.out.display(), result.waypoints.len());

    if let Some(report_path) = &cli.report {
        let gpx_name = cli.out.to_string_lossy();
        let mut report_out = BufWriter::new(File::create(report_path)?);
        report::write_report(&mut report_out, &config, &result.stats, &gpx_name)?;
        report_out.flush()?;
        println!("{}: report written", report_path.display());
    }

    println!(
        "{:.2} km, ~{:.0} min; {} right / {} left / {} straight / {} turn-arounds",
        result.stats.total_length_m / 1000.0,
        result.stats.drive_time_s / 60.0,
        result.stats.right_turns,
        result.stats.left_turns,
        result.stats.straight,
        result.stats.u_turns,
    );

    Ok(())
}
