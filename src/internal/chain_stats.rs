//! Chain-length survey: fills `ChainedMap`s with random keys under several
//! load-factor profiles and plots how chains grow with the entry count.
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]

use chainmap::{ChainStatistics, ChainedMap};
use plotters::prelude::*;
use rand::Rng;

/// Number of keys inserted per profile
const KEY_COUNT: usize = 50_000;
/// Entries inserted between two samples
const SAMPLE_EVERY: usize = 1_000;

/// Load-factor profiles compared against each other
const PROFILES: [(&str, f64, f64); 3] = [
    ("tight (0.10, 0.50)", 0.10, 0.50),
    ("default (0.25, 0.75)", 0.25, 0.75),
    ("loose (0.40, 0.90)", 0.40, 0.90),
];

/// Line colors, one per profile
const COLORS: [RGBColor; 3] = [RGBColor(220, 50, 50), RGBColor(50, 90, 220), RGBColor(50, 180, 50)];

/// Font used for captions and axis labels
const FONT_FAMILY: &str = "sans-serif";

/// Samples gathered for one profile
struct Survey {
    /// Profile label
    name: &'static str,
    /// `(entries, mean chain length over occupied buckets)`
    mean: Vec<(usize, f64)>,
    /// `(entries, longest chain)`
    longest: Vec<(usize, f64)>,
    /// `(entries, bucket count)`
    capacity: Vec<(usize, f64)>,
}

/// Inserts every key into a map with the given bounds, sampling chain statistics
fn survey(
    name: &'static str,
    lower: f64,
    upper: f64,
    keys: &[u64],
) -> Result<Survey, Box<dyn std::error::Error>> {
    let mut map = ChainedMap::with_load_factors(lower, upper)?;
    let mut result =
        Survey { name, mean: Vec::new(), longest: Vec::new(), capacity: Vec::new() };

    for (inserted, &key) in keys.iter().enumerate() {
        map.insert(key, inserted);
        let entries = inserted + 1;
        if entries % SAMPLE_EVERY == 0 {
            result.mean.push((entries, map.mean_chain_length()));
            result.longest.push((entries, map.longest_chain() as f64));
            result.capacity.push((entries, map.capacity() as f64));
        }
    }

    let histogram = map.chain_histogram();
    println!(
        "  {name}: capacity = {}, load = {:.3}, longest chain = {}, histogram = {histogram:?}",
        map.capacity(),
        map.load_factor(),
        map.longest_chain()
    );

    Ok(result)
}

/// Draws one line per survey into a PNG file
fn plot<F>(
    path: &str,
    caption: &str,
    y_desc: &str,
    surveys: &[Survey],
    series: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Fn(&Survey) -> &[(usize, f64)],
{
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = surveys
        .iter()
        .flat_map(|survey| series(survey).iter().map(|&(_, y)| y))
        .fold(0.0, f64::max) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT_FAMILY, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0..KEY_COUNT, 0.0..max_y.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Entries Inserted")
        .y_desc(y_desc)
        .axis_desc_style((FONT_FAMILY, 16))
        .draw()?;

    for (survey, color) in surveys.iter().zip(COLORS.iter()) {
        let line_style = ShapeStyle::from(color).stroke_width(2);
        chart
            .draw_series(LineSeries::new(series(survey).iter().copied(), line_style))?
            .label(survey.name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Surveys every profile and writes the plots
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The same keys for every profile keep the comparison fair
    let mut rng = rand::rng();
    let keys: Vec<u64> = (0..KEY_COUNT).map(|_| rng.random()).collect();

    println!("Surveying {KEY_COUNT} random keys");
    let surveys = PROFILES
        .iter()
        .map(|&(name, lower, upper)| survey(name, lower, upper, &keys))
        .collect::<Result<Vec<_>, _>>()?;

    plot(
        "mean_chain_length.png",
        "Mean Chain Length per Occupied Bucket",
        "Entries per occupied bucket",
        &surveys,
        |survey| survey.mean.as_slice(),
    )?;
    plot("longest_chain.png", "Longest Chain", "Entries in longest bucket", &surveys, |survey| {
        survey.longest.as_slice()
    })?;
    plot("capacity.png", "Bucket Count", "Buckets", &surveys, |survey| survey.capacity.as_slice())?;

    println!("Generated plot images: mean_chain_length.png, longest_chain.png, capacity.png");

    Ok(())
}
