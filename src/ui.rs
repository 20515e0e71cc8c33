use crate::app::App;
use crate::atlas::{MapKind, Rgb, Tooltip};
use crate::braille::BrailleCanvas;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, LineGauge, Paragraph, Widget, Wrap},
    Frame,
};

/// Split the screen: slider, map, legend, annotation, status bar
fn layout(area: Rect) -> [Rect; 5] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Year slider
            Constraint::Min(3),    // Map
            Constraint::Length(2), // Legend
            Constraint::Length(2), // Annotation
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3], chunks[4]]
}

/// Year label at the left of the gauge (" 1992 ") plus the gap before the line
const SLIDER_LABEL_WIDTH: u16 = 7;

/// Gauge on the left, play button on the right
fn slider_chunks(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(10)])
        .split(area);
    [chunks[0], chunks[1]]
}

/// Screen cells of the slider line for a terminal of `area`
pub fn slider_track(area: Rect) -> Rect {
    let [gauge, _] = slider_chunks(layout(area)[0]);
    Rect {
        x: gauge.x + SLIDER_LABEL_WIDTH.min(gauge.width),
        width: gauge.width.saturating_sub(SLIDER_LABEL_WIDTH),
        ..gauge
    }
}

fn map_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Screen area the braille map occupies for a terminal of `area`
pub fn map_inner_area(area: Rect) -> Rect {
    map_block("").inner(layout(area)[1])
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let [slider, map, legend, annotation, status] = layout(frame.area());

    render_slider(frame, app, slider);
    render_map(frame, app, map);
    render_legend(frame, app, legend);
    render_annotation(frame, app, annotation);
    render_status_bar(frame, app, status);

    if let (Some(tooltip), Some((col, row))) = (app.hover_tooltip(), app.mouse_pos) {
        render_tooltip(frame, &tooltip, col, row);
    }
}

fn render_slider(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.view().state;
    let [gauge_area, button_area] = slider_chunks(area);

    let gauge = LineGauge::default()
        .filled_style(Style::default().fg(Color::Cyan))
        .unfilled_style(Style::default().fg(Color::DarkGray))
        .line_set(symbols::line::THICK)
        .label(Span::styled(
            format!(" {} ", state.year()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
        .ratio(state.progress());
    frame.render_widget(gauge, gauge_area);

    if state.playback_enabled() {
        let color = if state.is_playing() { Color::Green } else { Color::White };
        let button = Paragraph::new(Span::styled(format!(" {}", state.play_label()), Style::default().fg(color)));
        frame.render_widget(button, button_area);
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let block = map_block(view.kind().title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let map_widget = MapWidget {
        canvas: &app.canvas,
        hovered: app.hovered_region(),
    };
    frame.render_widget(map_widget, inner);
}

/// Braille choropleth with the hovered region highlighted
struct MapWidget<'a> {
    canvas: &'a BrailleCanvas,
    hovered: Option<usize>,
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = self.canvas.height().min(area.height as usize);
        for row_idx in 0..rows {
            let y = area.y + row_idx as u16;

            for (col_idx, cell) in self.canvas.row(row_idx).iter().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                let Some(color) = cell.color.filter(|_| cell.dots != 0) else {
                    continue;
                };
                let x = area.x + col_idx as u16;
                let target = buf[(x, y)].set_char(cell.glyph()).set_fg(to_color(color));
                if cell.region.is_some() && cell.region == self.hovered {
                    target.set_bg(Color::DarkGray);
                }
            }
        }
    }
}

/// Tick labels spread under a legend bar `width` cells wide
fn legend_labels(kind: MapKind, width: usize) -> String {
    let (low, high) = kind.scale().domain().extent();
    let mut line = vec![' '; width];

    for &tick in kind.legend_ticks() {
        let label = format!("{tick}%");
        let pos = ((tick - low) / (high - low) * width.saturating_sub(1) as f64).round() as usize;
        let start = pos.saturating_sub(label.len() / 2).min(width.saturating_sub(label.len()));
        for (i, ch) in label.chars().enumerate() {
            if let Some(slot) = line.get_mut(start + i) {
                *slot = ch;
            }
        }
    }

    line.into_iter().collect()
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let kind = app.view().kind();
    let title = format!(" {} ", kind.legend_title());
    let bar_width = (area.width as usize).saturating_sub(title.len() + 2).min(60);
    let scale = app.view().choropleth.scale();

    let mut bar = vec![Span::styled(title.clone(), Style::default().fg(Color::White))];
    bar.extend(
        scale
            .sample(bar_width)
            .into_iter()
            .map(|rgb| Span::styled("█", Style::default().fg(to_color(rgb)))),
    );
    bar.push(Span::styled(" ▒", Style::default().fg(to_color(scale.no_data()))));
    bar.push(Span::styled(" no data", Style::default().fg(Color::DarkGray)));

    let labels = Line::from(vec![
        Span::raw(" ".repeat(title.chars().count())),
        Span::styled(legend_labels(kind, bar_width), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(vec![Line::from(bar), labels]), area);
}

fn render_annotation(frame: &mut Frame, app: &App, area: Rect) {
    let text = app.view().annotation();
    let paragraph = Paragraph::new(Span::styled(format!(" {text}"), Style::default().fg(Color::Gray)))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Place a `width` x `height` box just below-right of the cursor, kept on screen
fn tooltip_rect(screen: Rect, col: u16, row: u16, width: u16, height: u16) -> Rect {
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    let x = col.saturating_add(2).min(screen.right().saturating_sub(width));
    let y = row.saturating_add(1).min(screen.bottom().saturating_sub(height));
    Rect::new(x, y, width, height)
}

fn render_tooltip(frame: &mut Frame, tooltip: &Tooltip, col: u16, row: u16) {
    let content = tooltip.title.chars().count().max(tooltip.body.chars().count()) as u16;
    let rect = tooltip_rect(frame.area(), col, row, content + 4, 4);

    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            tooltip.title.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(tooltip.body.as_str(), Style::default().fg(Color::Yellow))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(Clear, rect);
    frame.render_widget(paragraph, rect);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let borders = app.view().layer.settings.show_borders;
    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" ", Style::default()),
        Span::styled(
            if borders { "[B]order " } else { "[b]order " },
            Style::default().fg(if borders { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | Tab:map ←/→:year Home/End hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.view().state.playback_enabled() {
        spans.push(Span::styled(" space:play", Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
