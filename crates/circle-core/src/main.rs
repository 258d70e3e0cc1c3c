use circle_core::cities::CITIES;
use circle_core::error::CircleError;
use circle_core::geo::{distance_m, walk_distance_m, ISOCHRONE_MINUTES};
use circle_core::mock::mock_result;
use circle_core::render::poi::poi_markers;
use circle_core::render::score::ScoreView;
use circle_core::state::{CategoryFilter, DEFAULT_WALK_SPEED};
use circle_core::types::{Category, LatLng};
use circle_core::{load_result, state::AppState};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "circle", about = "15-minute living circle toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List supported cities
    Cities,

    /// Walk distances for the 5/10/15-minute bands
    Walk {
        /// Walking speed in km/h
        #[arg(long, default_value_t = DEFAULT_WALK_SPEED)]
        speed: f64,
    },

    /// Great-circle distance in meters
    Distance {
        lat1: f64,
        lng1: f64,
        lat2: f64,
        lng2: f64,
    },

    /// Print the offline demo result as JSON
    Mock {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Text report of a saved analysis response
    Report {
        /// Analysis response JSON file
        input: PathBuf,

        /// Selected point as `lat,lng`, enables distances
        #[arg(long, value_parser = parse_point)]
        origin: Option<LatLng>,

        #[arg(long, default_value_t = DEFAULT_WALK_SPEED)]
        walk_speed: f64,

        /// Comma-separated category codes to hide (e.g. medical,transport)
        #[arg(long, value_delimiter = ',', value_parser = parse_category)]
        hide: Vec<Category>,
    },
}

fn parse_point(s: &str) -> Result<LatLng, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lng: {s}"))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("bad latitude: {e}"))?;
    let lng = lng.trim().parse::<f64>().map_err(|e| format!("bad longitude: {e}"))?;
    Ok(LatLng::new(lat, lng))
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::from_code(s.trim()).ok_or_else(|| {
        let known: Vec<_> = Category::ALL.iter().map(|c| c.code()).collect();
        format!("Unknown category: {s}. Use: {}", known.join(", "))
    })
}

fn report(
    input: &Path,
    origin: Option<LatLng>,
    walk_speed: f64,
    hide: &[Category],
) -> Result<String, CircleError> {
    let result = load_result(input)?;
    let mut state = AppState::default();
    state.set_walk_speed(walk_speed)?;

    let mut filters = CategoryFilter::default();
    for c in hide {
        filters.set(*c, false);
    }

    let view = ScoreView::from_result(&result);
    let mut out = String::new();
    out.push_str(&format!("总分: {}  等级: {}\n", view.total, view.grade));
    if !view.summary.is_empty() {
        out.push_str(&format!("{}\n", view.summary));
    }
    out.push('\n');
    for bar in &view.bars {
        let filled = (bar.width / 5.0).round() as usize;
        out.push_str(&format!(
            "{} {:<8} {:<20} {:>3}  ({} 处)\n",
            bar.icon,
            bar.name,
            "█".repeat(filled),
            bar.label,
            bar.poi_count
        ));
    }
    if !view.suggestions.is_empty() {
        out.push_str("\n建议:\n");
        for s in &view.suggestions {
            out.push_str(&format!("  - {s}\n"));
        }
    }

    let markers = poi_markers(&result.pois, &filters, origin, state.walk_speed);
    out.push_str(&format!("\n设施: {} 处\n", markers.len()));
    for m in &markers {
        let walk = m
            .walk
            .map(|w| format!("  {} {}", w.distance_text(), w.time_text()))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {} {} [{}] {:.4}, {:.4}{walk}\n",
            m.category.icon(),
            m.name,
            m.sub_type,
            m.lng,
            m.lat
        ));
    }
    Ok(out)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let output = match cli.command {
        Command::Cities => Ok(CITIES
            .iter()
            .map(|c| {
                format!(
                    "{:<10} {}  center {:.4}, {:.4}  zoom {}  {}",
                    c.key, c.name, c.center.lat, c.center.lng, c.zoom, c.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
        Command::Walk { speed } => {
            let mut state = AppState::default();
            state.set_walk_speed(speed).map(|_| {
                ISOCHRONE_MINUTES
                    .iter()
                    .map(|m| format!("{m:>2} 分钟: {:.0} 米", walk_distance_m(speed, *m)))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
        } => Ok(format!(
            "{:.1}",
            distance_m(LatLng::new(lat1, lng1), LatLng::new(lat2, lng2))
        )),
        Command::Mock { lat, lng, pretty } => {
            let result = mock_result(LatLng::new(lat, lng));
            if pretty {
                serde_json::to_string_pretty(&result)
            } else {
                serde_json::to_string(&result)
            }
            .map_err(CircleError::from)
        }
        Command::Report {
            input,
            origin,
            walk_speed,
            hide,
        } => report(&input, origin, walk_speed, &hide),
    };

    match output {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT: &str = r#"{
        "total_score": 72.5,
        "grade": "B",
        "summary": "良好",
        "category_scores": [
            {"category": "medical", "name": "医疗卫生", "score": 80, "poi_count": 1},
            {"category": "transport", "name": "交通设施", "score": 60, "poi_count": 1}
        ],
        "suggestions": ["增加托育设施"],
        "isochrone": {"features": []},
        "pois": {"features": [
            {"geometry": {"type": "Point", "coordinates": [120.0, 30.0]},
             "properties": {"name": "社区医院", "category": "medical", "type": "poi"}},
            {"geometry": {"type": "Point", "coordinates": [120.01, 30.0]},
             "properties": {"name": "地铁站", "category": "transport", "type": "poi"}},
            {"geometry": {"type": "Point", "coordinates": [120.0, 30.01]},
             "properties": {"name": "小学", "category": "education", "type": "poi"}}
        ]}
    }"#;

    fn write_result(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "circle-report-{tag}-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, RESULT).unwrap();
        path
    }

    #[test]
    fn test_report_lists_scores_and_pois() {
        let path = write_result("all");
        let out = report(&path, None, DEFAULT_WALK_SPEED, &[]).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(out.starts_with("总分: 72.5  等级: B\n"));
        assert!(out.contains("良好"));
        assert!(out.contains("  - 增加托育设施"));
        assert!(out.contains("设施: 3 处"));
        assert!(out.contains("社区医院"));
        // No origin, no distances
        assert!(!out.contains("米"));
    }

    #[test]
    fn test_report_hides_categories() {
        let path = write_result("hide");
        let out = report(
            &path,
            None,
            DEFAULT_WALK_SPEED,
            &[Category::Medical, Category::Transport],
        )
        .unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(out.contains("设施: 1 处"));
        assert!(out.contains("小学"));
        assert!(!out.contains("地铁站"));
        assert!(!out.contains("社区医院"));
    }

    #[test]
    fn test_report_with_origin_shows_walk() {
        let path = write_result("origin");
        let out = report(&path, Some(LatLng::new(30.0, 120.0)), 5.0, &[]).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(out.contains("0米 约0.0分钟"));
        assert_eq!(out.matches("分钟").count(), 3);
    }

    #[test]
    fn test_report_rejects_bad_walk_speed() {
        let path = write_result("speed");
        let err = report(&path, None, 0.0, &[]).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, CircleError::InvalidWalkSpeed(s) if s == 0.0));
    }

    #[test]
    fn test_report_missing_file() {
        let err = report(Path::new("/nonexistent/result.json"), None, 5.0, &[]).unwrap_err();
        assert!(matches!(err, CircleError::Io(_)));
    }

    #[test]
    fn test_parse_cli_values() {
        assert_eq!(parse_point("30.27, 120.15"), Ok(LatLng::new(30.27, 120.15)));
        assert!(parse_point("30.27").is_err());
        assert_eq!(parse_category(" transport"), Ok(Category::Transport));
        assert!(parse_category("sports").unwrap_err().contains("medical"));
    }
}
