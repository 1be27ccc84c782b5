use std::{fmt, fs, io};
use std::path::{Path, PathBuf};
use clap::{
    Arg, ArgAction, ArgMatches, Command, crate_version, crate_authors,
    value_parser,
};
use datalayer::{Config, DataLayer, DataLayerItem, LayerListener, MapEvent};
use datalayer::config::ConfigError;
use kurbo::Point;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "datalayer.toml";


//------------ Options -------------------------------------------------------

struct Options {
    config: Config,
    items: PathBuf,
    events: Option<PathBuf>,
}

impl Options {
    fn get() -> Result<Self, Failed> {
        let mut matches = Self::get_matches();

        let (config_path, insist) = match matches.remove_one::<PathBuf>(
            "config"
        ) {
            Some(path) => (path, true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let mut config = match Config::load(&config_path) {
            Ok(config) => config,
            Err(ConfigError::Io(err))
                if err.kind() == io::ErrorKind::NotFound && !insist =>
            {
                Config::default()
            }
            Err(err) => {
                eprintln!(
                    "Failed to read config file {}: {}",
                    config_path.display(), err
                );
                return Err(Failed)
            }
        };
        if let Some(name) = matches.remove_one::<String>("name") {
            config.layer.name = name;
        }

        Ok(Options {
            config,
            items: matches.remove_one("items").ok_or(Failed)?,
            events: matches.remove_one("events"),
        })
    }

    fn get_matches() -> ArgMatches {
        Command::new("datalayer")
            .version(crate_version!())
            .author(crate_authors!())
            .about("replays map events against a data layer")
            .arg(Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("the configuration file")
                .action(ArgAction::Set)
            )
            .arg(Arg::new("name")
                .short('n')
                .long("name")
                .value_name("NAME")
                .help("the name of the layer")
                .action(ArgAction::Set)
            )
            .arg(Arg::new("events")
                .short('e')
                .long("events")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("a JSON file with the events to replay")
                .action(ArgAction::Set)
            )
            .arg(Arg::new("items")
                .value_name("ITEMS")
                .value_parser(value_parser!(PathBuf))
                .help("a JSON file with the items to show")
                .required(true)
                .action(ArgAction::Set)
            )
            .get_matches()
    }

    fn run(self) -> Result<(), Failed> {
        let items: Vec<DataLayerItem> = load_json(&self.items)?;
        let steps: Vec<Step> = match self.events {
            Some(ref path) => load_json(path)?,
            None => Vec::new(),
        };

        let mut view = self.config.view.viewport();
        let mut layer = DataLayer::new(
            self.config.layer.name.clone(), Printer
        ).with_palette(self.config.layer.palette());

        let report = layer.populate(&mut view, &items);
        for rejected in &report.rejected {
            eprintln!("Rejected item {}", rejected);
        }
        println!(
            "populated {} with {} features from {} items",
            layer.name(), report.features, report.items
        );

        for step in steps {
            let res = match step {
                Step::PointerMove { pixel } => {
                    let res = layer.handle_event(
                        &mut view, MapEvent::PointerMove(point(pixel))
                    );
                    println!("cursor {}", view.cursor());
                    res
                }
                Step::Click { pixel } => {
                    layer.handle_event(
                        &mut view, MapEvent::Click(point(pixel))
                    )
                }
                Step::MoveStart => {
                    layer.handle_event(&mut view, MapEvent::MoveStart)
                }
                Step::Hover { id } => layer.hover(&id),
                Step::RemoveHover { id } => layer.remove_hover(&id),
                Step::Clicked { id } => layer.clicked(&id),
                Step::RemoveClicked { id } => layer.remove_clicked(&id),
                Step::Clear => {
                    layer.clear(&mut view);
                    Ok(())
                }
            };
            if let Err(err) = res {
                eprintln!("{}", err);
            }
        }

        for (id, feature) in layer.features().all_features() {
            match layer.style_of(feature) {
                Ok(style) => {
                    println!(
                        "feature {} of {} ({}): {}",
                        id.index(), feature.owner(),
                        feature.geometry().kind_name(), style
                    );
                }
                Err(err) => eprintln!("feature {}: {}", id.index(), err),
            }
        }
        Ok(())
    }
}


//------------ Step ----------------------------------------------------------

/// A single step of an event script.
#[derive(Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum Step {
    PointerMove { pixel: [f64; 2] },
    Click { pixel: [f64; 2] },
    MoveStart,
    Hover { id: String },
    RemoveHover { id: String },
    Clicked { id: String },
    RemoveClicked { id: String },
    Clear,
}


//------------ Printer -------------------------------------------------------

/// A listener that prints everything it is told.
struct Printer;

impl LayerListener for Printer {
    fn on_click(&mut self, ids: &[String], pixel: Point) {
        println!("click at {} on [{}]", Pixel(pixel), ids.join(", "));
    }

    fn on_hover(&mut self, id: &str, pixel: Point) {
        println!("hover at {} on {}", Pixel(pixel), id);
    }

    fn on_hover_end(&mut self) {
        println!("hover end");
    }

    fn on_moved(&mut self) {
        println!("moved");
    }
}

struct Pixel(Point);

impl fmt::Display for Pixel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}


//------------ Helpers -------------------------------------------------------

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, Failed> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to read {}: {}", path.display(), err);
            return Err(Failed)
        }
    };
    serde_json::from_str(&data).map_err(|err| {
        eprintln!("Failed to parse {}: {}", path.display(), err);
        Failed
    })
}

fn point([x, y]: [f64; 2]) -> Point {
    Point::new(x, y)
}

/// The error has already been reported.
#[derive(Clone, Copy, Debug)]
struct Failed;


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let options = match Options::get() {
        Ok(options) => options,
        Err(_) => std::process::exit(1),
    };
    if options.run().is_err() {
        std::process::exit(1)
    }
}
