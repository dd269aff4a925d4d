use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use vendorly::cart::{Cart, CartLine};
use vendorly::catalog::Catalog;
use vendorly::comparison;
use vendorly::config::VendorlyConfig;
use vendorly::geo::{format_distance, Coordinates, ProximityBand};
use vendorly::location::{LocationResolver, ResolvedLocation};
use vendorly::logging;
use vendorly::proximity::{check_radius, estimate_delivery_time, ProximitySearch, VendorSort};
use vendorly::server::{self, AppState};
use vendorly::{Result, VendorlyError};

/// Vendorly: find, compare and order from vendors near you.
///
/// Examples:
///   vendorly nearby "Andheri West"
///   vendorly nearby --lat 19.1356 --lng 72.8262 --sort rating --open-now
///   vendorly compare Koramangala --query apples
///   vendorly quote p1:2 p5
///   vendorly serve --port 8080
#[derive(Parser)]
#[command(name = "vendorly", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.vendorly/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog JSON export. Overrides `location.catalog_path`.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Offline mode: only use cache and built-in localities.
    #[arg(long, global = true)]
    offline: bool,

    /// Debug logging.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Distance and delivery estimate between two points.
    Distance {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lng: f64,
    },
    /// Vendors within a radius, filtered and sorted.
    Nearby {
        #[command(flatten)]
        at: LocationArgs,
        #[arg(long)]
        radius: Option<f64>,
        /// distance, rating, price_low or price_high.
        #[arg(long, value_parser = parse_sort)]
        sort: Option<VendorSort>,
        /// Only vendors that deliver here (ignores --radius).
        #[arg(long)]
        delivery_only: bool,
        #[arg(long)]
        min_rating: Option<f64>,
        #[arg(long)]
        max_fee: Option<f64>,
        /// Only vendors open right now.
        #[arg(long)]
        open_now: bool,
    },
    /// Vendors whose delivery radius covers the location.
    Deliverable {
        #[command(flatten)]
        at: LocationArgs,
    },
    /// Price comparison for products sold by several nearby vendors.
    Compare {
        #[command(flatten)]
        at: LocationArgs,
        #[arg(long)]
        radius: Option<f64>,
        /// Compare a single product across every vendor.
        #[arg(long, short = 'q')]
        query: Option<String>,
    },
    /// Products with a similar name in the same category.
    Similar {
        product_id: String,
        #[command(flatten)]
        at: LocationArgs,
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Resolve an area or city name.
    Locate {
        query: String,
        /// List every candidate instead of the best match.
        #[arg(long)]
        suggest: bool,
    },
    /// Describe a point.
    Reverse {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Price a cart. Items are PRODUCT_ID[:QUANTITY].
    Quote {
        #[arg(required = true, value_parser = parse_line)]
        items: Vec<CartLine>,
    },
    /// Run the HTTP API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// JSON log lines.
        #[arg(long)]
        json_logs: bool,
    },
}

/// Where the customer is: an area name, raw coordinates, or the last
/// location resolved.
#[derive(Args)]
struct LocationArgs {
    /// Area or city name. Example: "Andheri West"
    area: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,
}

impl LocationArgs {
    fn is_empty(&self) -> bool {
        self.area.is_none() && self.lat.is_none() && self.lng.is_none()
    }
}

fn parse_sort(s: &str) -> std::result::Result<VendorSort, String> {
    s.parse()
}

fn parse_line(s: &str) -> std::result::Result<CartLine, String> {
    let (id, qty) = match s.split_once(':') {
        Some((id, qty)) => {
            let qty = qty
                .parse::<u32>()
                .map_err(|_| format!("Invalid quantity in '{}'. Use PRODUCT_ID:QUANTITY.", s))?;
            (id, qty)
        }
        None => (s, 1),
    };
    if id.is_empty() {
        return Err(format!("Missing product id in '{}'", s));
    }
    Ok(CartLine {
        product_id: id.to_string(),
        quantity: qty,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = VendorlyConfig::load(cli.config.as_deref())?;
    if cli.offline {
        config.location.offline = true;
    }
    if let Some(path) = cli.catalog {
        config.location.catalog_path = Some(path);
    }

    match &cli.command {
        Command::Serve { json_logs, .. } if *json_logs || config.server.json_logs => {
            logging::init_json_logger(cli.verbose)
        }
        _ => logging::init_cli_logger(cli.verbose),
    }

    let catalog = Catalog::load_or_builtin(config.location.catalog_path.as_deref())?;
    let resolver = config.resolver();

    match cli.command {
        Command::Distance {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
        } => {
            let from = Coordinates::new(from_lat, from_lng)?;
            let to = Coordinates::new(to_lat, to_lng)?;
            let km = from.distance_to(&to);
            eprintln!("  {} \u{2192} {}: {}", from, to, format_distance(km));
            print_json(&serde_json::json!({
                "distance_km": km,
                "label": ProximityBand::label(km),
                "band": ProximityBand::of(km),
                "estimated_delivery_minutes": estimate_delivery_time(km, &config.delivery),
            }))
        }

        Command::Nearby {
            at,
            radius,
            sort,
            delivery_only,
            min_rating,
            max_fee,
            open_now,
        } => {
            let origin = locate_customer(&at, &resolver)?;
            let mut filter = config.default_filter();
            if let Some(r) = radius {
                filter.radius_km = check_radius(r)?;
            }
            if let Some(s) = sort {
                filter.sort_by = s;
            }
            filter.delivery_only = delivery_only;
            if let Some(r) = min_rating {
                filter.min_rating = r;
            }
            if let Some(f) = max_fee {
                filter.max_delivery_fee = f;
            }
            if open_now {
                filter.open_at = Some(config.local_now()?);
            }
            let search = ProximitySearch::new(origin).with_delivery(config.delivery);
            let vendors = search.apply_filter(&catalog.vendors, &filter);
            eprintln!("  {} vendor(s), sorted by {}", vendors.len(), filter.sort_by);
            print_json(&vendors)
        }

        Command::Deliverable { at } => {
            let origin = locate_customer(&at, &resolver)?;
            let search = ProximitySearch::new(origin).with_delivery(config.delivery);
            let vendors = search.deliverable(&catalog.vendors);
            eprintln!("  {} vendor(s) deliver here", vendors.len());
            print_json(&vendors)
        }

        Command::Compare { at, radius, query } => {
            let radius = check_radius(radius.unwrap_or(config.search.radius_km))?;
            let origin = locate_customer(&at, &resolver)?;
            let search = ProximitySearch::new(origin).with_delivery(config.delivery);
            let comparisons = match query {
                Some(q) => comparison::compare_product(&search, &catalog, &q),
                None => comparison::compare_nearby(&search, &catalog, radius),
            };
            for c in &comparisons {
                eprintln!(
                    "  {:<24} \u{20B9}{:.2} - \u{20B9}{:.2} across {} vendors",
                    c.product_name, c.lowest_price, c.highest_price, c.vendor_count
                );
            }
            print_json(&comparisons)
        }

        Command::Similar {
            product_id,
            at,
            threshold,
        } => {
            let target = catalog.require_product(&product_id)?;
            let threshold = threshold.unwrap_or(config.search.similarity_threshold);
            let similar = if at.is_empty() {
                let active: Vec<_> = catalog.products.iter().filter(|p| p.is_active).cloned().collect();
                comparison::find_similar_products(&active, target, threshold)
            } else {
                let search = ProximitySearch::new(locate_customer(&at, &resolver)?);
                comparison::similar_nearby(&search, &catalog, target, threshold)
            };
            print_json(&similar)
        }

        Command::Locate { query, suggest } => {
            let found = if suggest {
                resolver.search(&query)?
            } else {
                vec![resolver.resolve(&query)?]
            };
            for loc in &found {
                print_banner(loc);
            }
            print_json(&found)
        }

        Command::Reverse { lat, lng } => {
            let origin = Coordinates::new(lat, lng)?;
            let loc = resolver.reverse(origin.lat, origin.lng);
            print_banner(&loc);
            print_json(&loc)
        }

        Command::Quote { items } => {
            let cart = Cart::from_lines(&catalog, &items)?;
            let quote = cart.quote(&catalog)?;
            for v in &quote.vendors {
                eprintln!(
                    "  {:<24} subtotal \u{20B9}{:.2}  delivery \u{20B9}{:.2}",
                    v.vendor_name, v.subtotal, v.delivery_fee
                );
            }
            eprintln!("  Total \u{20B9}{:.2}", quote.total);
            print_json(&quote)
        }

        Command::Serve { host, port, .. } => {
            if let Some(h) = host {
                config.server.host = h;
            }
            if let Some(p) = port {
                config.server.port = p;
            }
            let state = AppState::new(catalog, config, resolver);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start(state))
        }
    }
}

/// Priority: --lat/--lng > area name > last resolved location.
fn locate_customer(at: &LocationArgs, resolver: &LocationResolver) -> Result<Coordinates> {
    let location = match (at.lat, at.lng, at.area.as_deref()) {
        (Some(lat), Some(lng), _) => {
            let origin = Coordinates::new(lat, lng)?;
            LocationResolver::from_manual(origin.lat, origin.lng)
        }
        (None, None, Some(area)) => resolver.resolve(area)?,
        (None, None, None) => resolver.last_known().ok_or_else(|| {
            VendorlyError::Usage("No location specified. Pass an area name or --lat and --lng.".into())
        })?,
        _ => return Err(VendorlyError::Usage("Both --lat and --lng are required.".into())),
    };
    print_banner(&location);
    Ok(location.coordinates())
}

fn print_banner(location: &ResolvedLocation) {
    eprintln!("  {}", location.display_line());
    eprintln!("  Source: {}", location.source);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
