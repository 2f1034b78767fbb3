use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use civicdesk_core::utils::{format_date, truncate_string};

use crate::app::{App, AppState};
use crate::ui::styles;

use super::ready_or_render;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    render_filter_bar(frame, app, chunks[0]);

    if ready_or_render(frame, &app.tasks, "Tasks", chunks[1]).is_none() {
        return;
    }
    render_task_table(frame, app, chunks[1]);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = app
        .task_status_filter
        .map_or("All", |s| s.as_str());

    let mut spans = vec![
        Span::styled(" [f] Status: ", styles::muted_style()),
        Span::styled(status, styles::highlight_style()),
        Span::styled("   [/] Search: ", styles::muted_style()),
    ];

    let searching = matches!(app.state, AppState::Searching);
    if app.search_query.is_empty() && !searching {
        spans.push(Span::styled("-", styles::muted_style()));
    } else {
        spans.push(Span::styled(app.search_query.clone(), styles::search_style()));
        if searching {
            spans.push(Span::styled("▌", styles::search_style()));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_task_table(frame: &mut Frame, app: &App, area: Rect) {
    let tasks = app.visible_tasks();
    let today = Local::now().date_naive();

    let header = Row::new(vec![
        Cell::from("ID"),
        Cell::from("Task"),
        Cell::from("Priority"),
        Cell::from("Status"),
        Cell::from("Department"),
        Cell::from("Due"),
        Cell::from("Assignee"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let style = if i == app.task_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let due_style = if task.is_overdue(today) {
                styles::error_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(task.task_id.clone()),
                Cell::from(truncate_string(&task.task_name, 40)),
                Cell::from(Span::styled(
                    task.priority.as_str(),
                    styles::priority_style(task.priority),
                )),
                Cell::from(Span::styled(
                    task.status.as_str(),
                    styles::status_style(task.status),
                )),
                Cell::from(task.department.clone()),
                Cell::from(Span::styled(format_date(&task.due_date), due_style)),
                Cell::from(task.assignee_name().unwrap_or("-").to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Fill(3),
        Constraint::Length(9),
        Constraint::Length(12),
        Constraint::Fill(1),
        Constraint::Length(13),
        Constraint::Fill(1),
    ];

    let total = app.tasks.data().map_or(0, |t| t.len());
    let mut actions = String::from("[s]tatus [Enter] comments");
    if app.can_delete_tasks() {
        actions.push_str(" [x] delete");
    }
    let title = format!(" Tasks ({}/{}) - {} ", tasks.len(), total, actions);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !tasks.is_empty() {
        state.select(Some(app.task_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
