use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Align2, Color32, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::generate_palette;
use crate::data::aggregate::{bin_end, filled_series, histogram, CategoryCount, Share};
use crate::data::model::YearRange;
use crate::state::{AppState, Tab};

/// Histogram bucket width for running times, in minutes.
const DURATION_BIN_MINUTES: u32 = 10;

const CHART_HEIGHT: f32 = 360.0;

// ---------------------------------------------------------------------------
// Tab strip (central panel)
// ---------------------------------------------------------------------------

/// Render the tab selector and the charts of the active tab.
pub fn chart_tabs(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }
    });
    ui.separator();

    if state.aggregations.subset_len == 0 {
        ui.label(RichText::new("No titles match the current filters.").italics());
    }

    match state.tab {
        Tab::TypeRating => {
            ui.columns(2, |cols: &mut [Ui]| {
                type_chart(&mut cols[0], state);
                rating_chart(&mut cols[1], &state.aggregations.rating_shares);
            });
        }
        Tab::Duration => duration_chart(ui, state),
        Tab::ReleaseCountry => {
            ui.columns(2, |cols: &mut [Ui]| {
                release_chart(&mut cols[0], state);
                country_chart(&mut cols[1], &state.aggregations.top_countries);
            });
        }
        Tab::Yearly => yearly_chart(ui, state),
    }
}

// ---------------------------------------------------------------------------
// Type & Rating
// ---------------------------------------------------------------------------

/// Bar per content type.
fn type_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Comparison between Movies and TV Shows");
    let counts = &state.aggregations.type_counts;

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, c.count as f64)
                .name(&c.category)
                .fill(state.colors.color_for(&c.category))
                .width(0.6)
        })
        .collect();

    Plot::new("type_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Type of Contents")
        .y_axis_label("Number of Titles")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            for (i, c) in counts.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, c.count as f64), &c.category)
                        .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}

/// Pie of rating shares with a proportions table underneath.
fn rating_chart(ui: &mut Ui, shares: &[Share]) {
    ui.strong("Percentage of Content Ratings");
    let palette = generate_palette(shares.len());

    let size = ui.available_width().min(CHART_HEIGHT * 0.7);
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let center = response.rect.center();
    let radius = size * 0.45;

    let mut start = -FRAC_PI_2;
    for (share, color) in shares.iter().zip(&palette) {
        let sweep = share.fraction as f32 * TAU;
        let steps = ((sweep / TAU) * 96.0).ceil().max(1.0) as usize;
        // Fan of triangles; a single polygon would not be convex past a half turn.
        for k in 0..steps {
            let a0 = start + sweep * k as f32 / steps as f32;
            let a1 = start + sweep * (k + 1) as f32 / steps as f32;
            painter.add(Shape::convex_polygon(
                vec![
                    center,
                    center + radius * Vec2::angled(a0),
                    center + radius * Vec2::angled(a1),
                ],
                *color,
                Stroke::NONE,
            ));
        }
        if shares.len() > 1 {
            painter.line_segment(
                [center, center + radius * Vec2::angled(start)],
                Stroke::new(1.0, Color32::BLACK),
            );
        }
        start += sweep;
    }

    ui.add_space(6.0);
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Rating");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Titles");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Share");
            });
        })
        .body(|mut body| {
            for (share, color) in shares.iter().zip(&palette) {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(&share.category).color(*color));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(share.count.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.1}%", share.fraction * 100.0));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Movie Duration
// ---------------------------------------------------------------------------

/// Histogram of film running times, or the data-quality error that stopped it.
fn duration_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Distribution of Movie Duration");

    let minutes = match &state.aggregations.movie_durations {
        Ok(m) => m,
        Err(e) => {
            ui.label(RichText::new(format!("Data-quality error: {e}")).color(Color32::RED));
            return;
        }
    };

    let width = DURATION_BIN_MINUTES as f64;
    let bars: Vec<Bar> = histogram(minutes, DURATION_BIN_MINUTES)
        .into_iter()
        .map(|(start, n)| {
            Bar::new(start as f64 + width / 2.0, n as f64)
                .width(width)
                .name(format!("{start}–{} min", bin_end(start, DURATION_BIN_MINUTES)))
                .stroke(Stroke::new(1.0, Color32::BLACK))
        })
        .collect();

    Plot::new("duration_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Duration (min)")
        .y_axis_label("No. of Movies")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(99, 110, 250)));
        });
}

// ---------------------------------------------------------------------------
// Release & Country
// ---------------------------------------------------------------------------

fn release_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Release Year vs Number of Shows");
    let points: Vec<[f64; 2]> = state
        .aggregations
        .release_trend
        .iter()
        .map(|(&year, &n)| [year as f64, n as f64])
        .collect();

    Plot::new("release_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Release Year")
        .y_axis_label("Number of Shows")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points))
                    .color(Color32::from_rgb(29, 185, 84))
                    .width(2.0),
            );
        });
}

/// Horizontal bars, largest at the top.
fn country_chart(ui: &mut Ui, countries: &[CategoryCount]) {
    ui.strong("Top 10 Countries by Number of Shows");
    let n = countries.len();
    let bars: Vec<Bar> = countries
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new((n - 1 - i) as f64, c.count as f64)
                .name(&c.category)
                .width(0.7)
        })
        .collect();

    Plot::new("country_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Number of Shows")
        .y_axis_label("Country")
        .show_axes([true, false])
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .horizontal()
                    .color(Color32::from_rgb(239, 85, 59)),
            );
            for (i, c) in countries.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(0.0, (n - 1 - i) as f64), &c.category)
                        .anchor(Align2::LEFT_CENTER),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Yearly Comparison
// ---------------------------------------------------------------------------

/// One line per type present in the subset, zero-filled across the
/// observed years.
fn yearly_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Movies vs TV Shows Released per Year");
    let pivot = &state.aggregations.type_by_year;

    let years = pivot
        .values()
        .flat_map(|series| series.keys().copied())
        .fold(None, |acc: Option<YearRange>, y| match acc {
            None => Some(YearRange::new(y, y)),
            Some(r) => Some(YearRange::new(r.low.min(y), r.high.max(y))),
        });

    Plot::new("yearly_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Number of Shows")
        .show(ui, |plot_ui| {
            let Some(years) = years else {
                return;
            };
            for (kind, series) in pivot {
                let color = state.colors.color_for(kind);
                let points: Vec<[f64; 2]> = filled_series(series, years.span())
                    .into_iter()
                    .map(|(y, n)| [y as f64, n as f64])
                    .collect();
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(kind)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(kind)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}
