use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use civicdesk_core::models::{OptimizationReport, PredictionReport};
use civicdesk_core::utils::{format_date, format_number, format_percent, percentage_change};

use crate::app::App;
use crate::ui::styles;

use super::ready_or_render;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(50),
            Constraint::Min(8),
        ])
        .split(area);

    let heading = Line::from(vec![
        Span::styled(" Predictive Analytics", styles::title_style()),
        Span::styled(
            format!("  {}", app.analytics_department),
            styles::highlight_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(heading), chunks[0]);

    if let Some(report) = ready_or_render(frame, &app.predictions, "Resource Forecast", chunks[1]) {
        render_predictions(frame, report, chunks[1]);
    }
    if let Some(report) = ready_or_render(frame, &app.optimization, "Optimal Allocation", chunks[2]) {
        render_optimization(frame, report, chunks[2]);
    }
}

fn render_predictions(frame: &mut Frame, report: &PredictionReport, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Period"),
        Cell::from("Budget"),
        Cell::from("Staff"),
        Cell::from("Equipment"),
    ])
    .style(styles::title_style());

    let rows: Vec<Row> = report
        .predictions
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(format_date(&p.date)),
                Cell::from(format!("${}", format_number(p.budget_allocation.round() as i64))),
                Cell::from(format!("{:.0}", p.staff_allocation)),
                Cell::from(format!("${}", format_number(p.equipment_allocation.round() as i64))),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let title = format!(
        " Resource Forecast - {} (confidence {}) ",
        report.model_type,
        format_percent(report.confidence * 100.0)
    );

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(table, area);
}

fn render_optimization(frame: &mut Frame, report: &OptimizationReport, area: Rect) {
    let change_style = |value: f64| {
        if value < 0.0 {
            styles::error_style()
        } else {
            styles::success_style()
        }
    };

    let row = |label: &'static str, current: f64, recommended: f64, change: f64, money: bool| {
        let fmt = |v: f64| {
            let n = format_number(v.round() as i64);
            if money {
                format!("${}", n)
            } else {
                n
            }
        };
        Line::from(vec![
            Span::styled(format!("  {:<12}", label), styles::muted_style()),
            Span::raw(format!("{:>14}", fmt(current))),
            Span::styled("  →  ", styles::muted_style()),
            Span::styled(format!("{:>14}", fmt(recommended)), styles::highlight_style()),
            Span::styled(
                format!(
                    "  ({:+}, {:+.1}%)",
                    change.round() as i64,
                    percentage_change(recommended, current)
                ),
                change_style(change),
            ),
        ])
    };

    let lines = vec![
        row(
            "Budget",
            report.current.budget,
            report.recommended.budget,
            report.change.budget,
            true,
        ),
        row(
            "Staff",
            report.current.staff,
            report.recommended.staff,
            report.change.staff,
            false,
        ),
        row(
            "Equipment",
            report.current.equipment,
            report.recommended.equipment,
            report.change.equipment,
            true,
        ),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", report.explanation),
            styles::list_item_style(),
        )),
    ];

    let block = Block::default()
        .title(" Optimal Allocation ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
