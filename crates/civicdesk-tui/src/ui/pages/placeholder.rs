use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use civicdesk_core::routes::Route;

use crate::ui::styles;

fn heading(route: Route) -> &'static str {
    match route {
        Route::Performance => "Performance Metrics",
        Route::Resources => "Resource Management",
        Route::Coordination => "Department Coordination",
        Route::Geospatial => "Geospatial View",
        Route::Reports => "Reports",
        other => other.title(),
    }
}

fn description(route: Route) -> &'static str {
    match route {
        Route::Performance => "Performance analytics will be implemented here",
        Route::Resources => "Resource allocation tools will be implemented here",
        Route::Coordination => "Inter-department collaboration tools will be implemented here",
        Route::Geospatial => "Interactive maps will be implemented here",
        Route::Reports => "Report generation will be implemented here",
        _ => "",
    }
}

pub fn render(frame: &mut Frame, route: Route, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", heading(route)), styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", description(route)),
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
