pub mod charting;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
};

use keystride::{
    clock::Clock,
    diff::{self, Outcome},
    lines::LineInfo,
    supplier::TextSupplier,
    SessionStatus, TypingMode,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

struct Palette {
    bold: Style,
    correct: Style,
    incorrect: Style,
    pending: Style,
    cursor: Style,
    context: Style,
    italic: Style,
    chart: Style,
}

impl Default for Palette {
    fn default() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let pending = Style::default().patch(bold).add_modifier(Modifier::DIM);
        Self {
            bold,
            correct: Style::default().patch(bold).fg(Color::Green),
            incorrect: Style::default().patch(bold).fg(Color::Red),
            pending,
            cursor: Style::default().patch(pending).add_modifier(Modifier::UNDERLINED),
            context: Style::default().fg(Color::DarkGray),
            italic: Style::default().add_modifier(Modifier::ITALIC),
            chart: Style::default().fg(Color::Magenta),
        }
    }
}

fn glyph(c: char, outcome: Option<Outcome>) -> String {
    match (c, outcome) {
        ('\t', _) => "    ".to_owned(),
        (' ', Some(Outcome::Incorrect)) => "·".to_owned(),
        (c, _) => c.to_string(),
    }
}

/// Spans for one line of the window, styled by what has been typed so far.
/// A trailing newline is drawn as `↵` so it can be seen and typed.
fn line_spans<'a>(
    line: &LineInfo,
    outcomes: &[Outcome],
    typed_len: usize,
    palette: &Palette,
) -> Vec<Span<'a>> {
    let newline = line.has_newline.then_some('↵');
    let cells = line
        .text
        .chars()
        .chain(newline)
        .enumerate()
        .map(|(offset, c)| {
            let idx = line.start_index + offset;
            let outcome = outcomes.get(idx).copied();
            let style = match outcome {
                Some(Outcome::Correct) => palette.correct,
                Some(Outcome::Incorrect) => palette.incorrect,
                None if idx == typed_len => palette.cursor,
                None => palette.pending,
            };
            (glyph(c, outcome), style)
        });

    cells
        .chunk_by(|(_, style)| *style)
        .into_iter()
        .map(|(style, group)| Span::styled(group.map(|(text, _)| text).collect::<String>(), style))
        .collect()
}

fn stats_line<S: TextSupplier, C: Clock>(app: &App<S, C>) -> String {
    let state = app.session.state();
    let mut parts = vec![format!("{}s", state.time_left)];
    match app.session.settings().mode {
        TypingMode::English => parts.push(format!("{} wpm", state.wpm)),
        TypingMode::Coder => parts.push(format!("{} lpm", state.lpm)),
        TypingMode::Chinese | TypingMode::Custom => {}
    }
    parts.push(format!("{} cpm", state.cpm));
    parts.push(format!("{}% acc", state.accuracy));
    parts.push(format!("{} err", state.errors));
    parts.join("   ")
}

fn settings_line<S: TextSupplier, C: Clock>(app: &App<S, C>) -> String {
    let settings = app.session.settings();
    let mut parts = vec![settings.mode.to_string()];
    if let Some(sub_mode) = settings.sub_mode() {
        parts.push(sub_mode);
    }
    parts.push(settings.difficulty.to_string());
    parts.push(format!("{}s", settings.duration));
    parts.join(" · ")
}

impl<S: TextSupplier, C: Clock> Widget for &App<S, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::default();
        let state = self.session.state();

        match state.status {
            SessionStatus::Idle | SessionStatus::Running => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([
                        Constraint::Min(0),
                        Constraint::Length(2), // stats
                        Constraint::Length(3), // window
                        Constraint::Length(1), // preedit
                        Constraint::Min(0),
                        Constraint::Length(1), // settings
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                let stats = Paragraph::new(Span::styled(stats_line(self), palette.pending))
                    .alignment(Alignment::Center);
                stats.render(chunks[1], buf);

                let outcomes = diff::outcomes(&state.display_text, &state.typed_text);
                let window = self.session.display_window();
                let lines = vec![
                    Line::from(Span::styled(window.prev_line.text.clone(), palette.context)),
                    Line::from(line_spans(
                        &window.current_line,
                        &outcomes,
                        state.typed_len,
                        &palette,
                    )),
                    Line::from(Span::styled(window.next_line.text.clone(), palette.context)),
                ];
                Paragraph::new(lines).render(chunks[2], buf);

                if !self.session.preedit().is_empty() {
                    Paragraph::new(Span::styled(self.session.preedit().to_owned(), palette.italic))
                        .render(chunks[3], buf);
                }

                let hint = if state.status == SessionStatus::Idle {
                    "start typing"
                } else {
                    "typing"
                };
                Paragraph::new(Span::styled(
                    format!("{}   [{hint}]", settings_line(self)),
                    palette.italic,
                ))
                .alignment(Alignment::Center)
                .render(chunks[5], buf);

                Paragraph::new(Span::styled(
                    "(^r)estart / (^n)ew / (^e) mode / (^d)ifficulty / (^t)ime / (^l)anguage / (esc)ape",
                    palette.italic,
                ))
                .render(chunks[6], buf);
            }
            SessionStatus::Finished => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([
                        Constraint::Min(1),    // chart
                        Constraint::Length(1), // stats
                        Constraint::Length(1), // settings
                        Constraint::Length(1), // padding
                        Constraint::Length(1), // legend
                    ])
                    .split(area);

                let (overall_duration, highest_cpm) = charting::compute_chart_params(
                    &state.cpm_history,
                    self.session.settings().duration,
                );

                let points: Vec<(f64, f64)> =
                    state.cpm_history.iter().map(|&p| p.into()).collect();
                let datasets = vec![Dataset::default()
                    .marker(ratatui::symbols::Marker::Braille)
                    .style(palette.chart)
                    .graph_type(GraphType::Line)
                    .data(&points)];

                let chart = Chart::new(datasets)
                    .x_axis(
                        Axis::default()
                            .title("seconds")
                            .bounds([1.0, overall_duration])
                            .labels(vec![
                                Span::styled("1", palette.bold),
                                Span::styled(
                                    charting::format_label(overall_duration),
                                    palette.bold,
                                ),
                            ]),
                    )
                    .y_axis(
                        Axis::default()
                            .title("cpm")
                            .bounds([0.0, highest_cpm])
                            .labels(vec![
                                Span::styled("0", palette.bold),
                                Span::styled(charting::format_label(highest_cpm), palette.bold),
                            ]),
                    );
                chart.render(chunks[0], buf);

                Paragraph::new(Span::styled(stats_line(self), palette.bold))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);

                Paragraph::new(Span::styled(settings_line(self), palette.italic))
                    .alignment(Alignment::Center)
                    .render(chunks[2], buf);

                Paragraph::new(Span::styled("(^r)etry / (^n)ew / (esc)ape", palette.italic))
                    .render(chunks[4], buf);
            }
        }
    }
}
