extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate multibrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use multibrot::{
    Bailout, Config, Endpoints, GifEncoder, LoopCount, ProgressLine, SweepTarget,
};
use std::io::{self, BufWriter};
use std::str::FromStr;
use std::time::Duration;

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_float(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(f) if f.is_finite() => Ok(()),
        _ => Err(err.to_string()),
    }
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Option<T> {
    matches.value_of(name).and_then(|s| T::from_str(s).ok())
}

const DIMENSION: &str = "dimension";
const FRAMES: &str = "frames";
const DELAY: &str = "delay";
const ITERATIONS: &str = "iterations";
const POWER_START: &str = "powerStart";
const POWER_END: &str = "powerEnd";
const SWEEP: &str = "sweep";
const EXPONENT: &str = "exponent";
const ENDPOINTS: &str = "endpoints";
const BAILOUT: &str = "bailout";
const THREADS: &str = "threads";
const LOOPS: &str = "loops";
const TIMEOUT: &str = "timeout";

fn args<'a>() -> ArgMatches<'a> {
    App::new("multibrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Renders an animated multibrot sweep as a GIF on standard output")
        .arg(
            Arg::with_name(DIMENSION)
                .long(DIMENSION)
                .short("d")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        65_535,
                        "Could not parse image dimension",
                        "Image dimension must be between 1 and 65535",
                    )
                })
                .help("Width and height of each frame"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        1_000_000,
                        "Could not parse frame count",
                        "Frame count must be between 0 and 1000000",
                    )
                })
                .help("Total number of frames to render"),
        )
        .arg(
            Arg::with_name(DELAY)
                .long(DELAY)
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        65_535,
                        "Could not parse frame delay",
                        "Frame delay must be between 0 and 65535",
                    )
                })
                .help("Hundredths of a second between frames"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Maximum number of iterations per pixel"),
        )
        .arg(
            Arg::with_name(POWER_START)
                .long(POWER_START)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2.0")
                .validator(|s| validate_float(&s, "Could not parse powerStart"))
                .help("First value of the sweep"),
        )
        .arg(
            Arg::with_name(POWER_END)
                .long(POWER_END)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("10.0")
                .validator(|s| validate_float(&s, "Could not parse powerEnd"))
                .help("Last value of the sweep"),
        )
        .arg(
            Arg::with_name(SWEEP)
                .long(SWEEP)
                .takes_value(true)
                .possible_values(&["power", "extent"])
                .default_value("power")
                .help("Sweep the exponent, or the half-width of the domain"),
        )
        .arg(
            Arg::with_name(EXPONENT)
                .long(EXPONENT)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2.0")
                .validator(|s| validate_float(&s, "Could not parse exponent"))
                .help("Exponent used while sweeping the extent"),
        )
        .arg(
            Arg::with_name(ENDPOINTS)
                .long(ENDPOINTS)
                .takes_value(true)
                .possible_values(&["inclusive", "exclusive"])
                .default_value("inclusive")
                .help("Whether the last frame and last pixel land on the end of their range"),
        )
        .arg(
            Arg::with_name(BAILOUT)
                .long(BAILOUT)
                .takes_value(true)
                .validator(|s| validate_float(&s, "Could not parse bailout radius"))
                .help("Fixed escape radius (default: the domain's right edge)"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse thread count",
                        "Thread count must be between 1 and 4096",
                    )
                })
                .help("Frames rendered at once (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(LOOPS)
                .long(LOOPS)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        65_535,
                        "Could not parse loop count",
                        "Loop count must be between 0 and 65535",
                    )
                })
                .help("Times to play the animation, 0 for forever (default: frame count)"),
        )
        .arg(
            Arg::with_name(TIMEOUT)
                .long(TIMEOUT)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        u64::max_value(),
                        "Could not parse timeout",
                        "Timeout must be at least one second",
                    )
                })
                .help("Give up if no frame finishes for this many seconds"),
        )
        .get_matches()
}

fn config(matches: &ArgMatches) -> Config {
    let defaults = Config::default();
    Config {
        dimension: value(matches, DIMENSION).unwrap_or(defaults.dimension),
        frames: value(matches, FRAMES).unwrap_or(defaults.frames),
        delay: value(matches, DELAY).unwrap_or(defaults.delay),
        iterations: value(matches, ITERATIONS).unwrap_or(defaults.iterations),
        power_start: value(matches, POWER_START).unwrap_or(defaults.power_start),
        power_end: value(matches, POWER_END).unwrap_or(defaults.power_end),
        sweep: match matches.value_of(SWEEP) {
            Some("extent") => SweepTarget::Extent,
            _ => SweepTarget::Exponent,
        },
        exponent: value(matches, EXPONENT).unwrap_or(defaults.exponent),
        endpoints: match matches.value_of(ENDPOINTS) {
            Some("exclusive") => Endpoints::Exclusive,
            _ => Endpoints::Inclusive,
        },
        bailout: value(matches, BAILOUT).map_or(defaults.bailout, Bailout::Radius),
        threads: value(matches, THREADS).unwrap_or_else(num_cpus::get),
        loops: value(matches, LOOPS).map(|n: u16| match n {
            0 => LoopCount::Infinite,
            n => LoopCount::Finite(n),
        }),
        frame_timeout: value(matches, TIMEOUT).map(Duration::from_secs),
        ..defaults
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = config(&args());
    debug!("{:?}", config);

    let stdout = io::stdout();
    let mut encoder = GifEncoder::new(BufWriter::new(stdout.lock()), config.palette.clone());
    let mut progress = ProgressLine::new(io::stderr());

    match multibrot::run(&config, &mut encoder, &mut progress) {
        Ok(Some(frames)) => info!("wrote {} frames", frames),
        Ok(None) => info!("nothing to write"),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
