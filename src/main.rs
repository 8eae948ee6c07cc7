use trace_matcher::api::{MatchRequest, MatchResponse};
use trace_matcher::util::initialize_logger;
use trace_matcher::{Graph, MatchOptions, Matcher, Result};

use log::{error, info};
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use wkt::ToWkt;

const USAGE: &str = "usage: trace-matcher <network.json> <request.json> [--wkt]";

fn run(network: &str, request: &str, as_wkt: bool) -> Result<()> {
    let options = MatchOptions::from_env()?;
    let matcher = Matcher::new(Graph::from_file(network)?, options)?;

    let request: MatchRequest = serde_json::from_reader(BufReader::new(File::open(request)?))
        .map_err(std::io::Error::from)?;

    info!("Matching {} points", request.points.len());
    let trace = request.trace()?;
    let result = matcher.match_with(&trace, &request.options)?;

    if as_wkt {
        println!("{}", result.geometry().wkt_string());
    } else {
        let response = MatchResponse::from(result);
        println!(
            "{}",
            serde_json::to_string_pretty(&response).map_err(std::io::Error::from)?
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    initialize_logger();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let as_wkt = args.iter().any(|arg| arg == "--wkt");
    let paths = args
        .iter()
        .filter(|arg| !arg.starts_with("--"))
        .collect::<Vec<_>>();

    let [network, request] = paths.as_slice() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(network, request, as_wkt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
