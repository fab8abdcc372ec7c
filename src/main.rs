use clap::Parser;
use nws_forecast::geocode::{Nominatim, Resolver, DEFAULT_GEOCODER_URL};
use nws_forecast::nws::{Client, DEFAULT_API_BASE};
use nws_forecast::{logging, pipeline, render};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::time::Duration;

const DEFAULT_ADDRESS: &str = "Durham, NC";

#[derive(Debug, Parser)]
#[clap(about = "Show the National Weather Service forecast for an address")]
struct Args {
    /// Address, zipcode or `lat, lon` to look up.
    #[clap(default_value_t = String::from(DEFAULT_ADDRESS))]
    address: String,

    /// Keep prompting for addresses on stdin.
    #[clap(short, long)]
    interactive: bool,

    #[clap(short = 'a', long, default_value_t = String::from("nws-forecast"))]
    user_agent: String,

    #[clap(long, default_value_t = String::from(DEFAULT_API_BASE))]
    api_base: String,

    #[clap(long, default_value_t = String::from(DEFAULT_GEOCODER_URL))]
    geocoder_url: String,

    /// Per-request timeout in seconds, 0 to wait forever.
    #[clap(long, default_value_t = 30)]
    timeout: u64,

    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    let timeout = Some(Duration::from_secs(args.timeout)).filter(|t| !t.is_zero());
    let client = Client::new(&args.user_agent, &args.api_base, timeout)?;
    let resolver = Resolver::new(Nominatim::new(
        &args.user_agent,
        &args.geocoder_url,
        timeout,
    )?);

    let stdout = io::stdout();
    if !args.interactive {
        let report = pipeline::run(&resolver, &client, &args.address);
        render::render(&report, &mut stdout.lock())?;
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Enter Address [{}]: ", args.address);
        stdout.lock().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let address = match line.trim() {
            "" => args.address.as_str(),
            address => address,
        };
        let report = pipeline::run(&resolver, &client, address);
        render::render(&report, &mut stdout.lock())?;
        println!();
    }
    Ok(())
}
