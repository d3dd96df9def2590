use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use superstore_analytics::{
    format_thousands, Category, DashboardSession, DashboardSnapshot, DashboardView, Region,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Trend,
    Data,
    Filters,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Trend, Page::Data, Page::Filters];

    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::Trend,
            Page::Trend => Page::Data,
            Page::Data => Page::Filters,
            Page::Filters => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::Filters,
            Page::Trend => Page::Overview,
            Page::Data => Page::Trend,
            Page::Filters => Page::Data,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Overview => "Overview",
            Page::Trend => "Revenue Trend",
            Page::Data => "Data",
            Page::Filters => "Filters",
        }
    }
}

pub struct App {
    pub session: DashboardSession,
    pub view: DashboardView,
    pub state: TableState,
    pub current_page: Page,
}

impl App {
    pub fn new(session: DashboardSession) -> Self {
        let view = session.view();
        let mut app = Self {
            session,
            view,
            state: TableState::default(),
            current_page: Page::Overview,
        };
        app.reset_selection();
        app
    }

    /// Recompute after every predicate change
    pub fn refresh(&mut self) {
        self.view = self.session.view();
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        if self.row_count() > 0 {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn row_count(&self) -> usize {
        self.view.snapshot().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn toggle_region(&mut self, region: Region) {
        self.session.predicate_mut().toggle_region(region);
        self.refresh();
    }

    pub fn toggle_category(&mut self, category: Category) {
        self.session.predicate_mut().toggle_category(category);
        self.refresh();
    }

    pub fn select_all(&mut self) {
        self.session.predicate_mut().select_all();
        self.refresh();
    }

    pub fn clear_filter(&mut self) {
        self.session.predicate_mut().clear();
        self.refresh();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(20),
            None => 0,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('a') => app.select_all(),
                KeyCode::Char('c') if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.clear_filter()
                }
                KeyCode::Char('c') => return Ok(()),
                KeyCode::Char(ch @ '1'..='4') => {
                    let index = ch as usize - '1' as usize;
                    app.toggle_region(Region::ALL[index]);
                }
                KeyCode::Char(ch @ '5'..='7') => {
                    let index = ch as usize - '5' as usize;
                    app.toggle_category(Category::ALL[index]);
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home if app.row_count() > 0 => app.state.select(Some(0)),
                KeyCode::End if app.row_count() > 0 => {
                    let last = app.row_count() - 1;
                    app.state.select(Some(last));
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    // The filters page stays usable when nothing matches
    if app.current_page == Page::Filters {
        render_filters(f, chunks[1], app);
    } else if app.current_page == Page::Data && !app.view.is_empty() {
        render_table(f, chunks[1], app);
    } else {
        match (&app.view, app.current_page) {
            (DashboardView::Ready(snapshot), Page::Overview) => {
                render_overview(f, chunks[1], snapshot)
            }
            (DashboardView::Ready(snapshot), Page::Trend) => render_trend(f, chunks[1], snapshot),
            _ => render_no_data(f, chunks[1]),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![Span::styled(
        "🛒 SuperStore Analytics  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("In view: {}/{}", app.row_count(), app.session.records().len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_no_data(f: &mut Frame, area: Rect) {
    let warning = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "  ⚠ No data available based on the current filter settings!",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Tab to open Filters, or 'a' to select everything.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" No Data "),
    );

    f.render_widget(warning, area);
}

fn render_overview(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    // KPI cards
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);

    for (card, slot) in snapshot.kpis.iter().zip(cards.iter()) {
        let negative = card.value.contains('-');
        let paragraph = Paragraph::new(vec![Line::from(Span::styled(
            format!(" {}", card.value),
            Style::default()
                .fg(if negative { Color::Red } else { Color::White })
                .add_modifier(Modifier::BOLD),
        ))])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", card.label)),
        );
        f.render_widget(paragraph, *slot);
    }

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    // Sub-categories: smallest at the top, matching the ascending order
    let bars: Vec<Bar> = snapshot
        .summary
        .sales_by_sub_category
        .iter()
        .map(|group| {
            Bar::default()
                .label(Line::from(group.sub_category.clone()))
                .value(group.sales.max(0.0) as u64)
                .text_value(format!("${}", format_thousands(group.sales)))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let bar_chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" 🏆 Top Selling Sub-Categories "),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(bar_chart, charts[0]);

    render_region_table(f, charts[1], snapshot);
}

fn render_region_table(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let header_cells = ["Region", "Sales", "Share"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = snapshot.summary.sales_by_region.iter().map(|entry| {
        Row::new(vec![
            Cell::from(entry.region.as_str()),
            Cell::from(format!("${}", format_thousands(entry.sales))),
            Cell::from(format!("{:.1}%", entry.share_pct)).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [Constraint::Length(10), Constraint::Length(12), Constraint::Length(8)],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" 🌍 Sales by Region "),
    );

    f.render_widget(table, area);
}

fn render_trend(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let bars: Vec<Bar> = snapshot
        .summary
        .sales_by_month
        .iter()
        .map(|entry| {
            Bar::default()
                .label(Line::from(entry.month.to_string()))
                .value(entry.sales.max(0.0) as u64)
                .text_value(format!("{:.0}k", entry.sales / 1000.0))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" 📈 Revenue Trend Over Time "),
        )
        .bar_width(7)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Order Date", "Region", "Category", "Sub-Category", "Sales", "Profit"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let records = app.view.snapshot().map(|s| s.records.as_slice()).unwrap_or(&[]);

    let rows = records.iter().map(|record| {
        let color = if record.profit < 0.0 { Color::Red } else { Color::Green };

        Row::new(vec![
            Cell::from(record.order_date.format("%Y-%m-%d").to_string()),
            Cell::from(record.region.as_str()),
            Cell::from(record.category.as_str()),
            Cell::from(record.sub_category.clone()),
            Cell::from(format!("{:.0}", record.sales)),
            Cell::from(format!("{:.2}", record.profit)).style(Style::default().fg(color)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(17),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" 📂 Detailed Data (newest first) "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn checkbox_line(key: char, label: &str, selected: bool) -> Line<'static> {
    let (mark, color) = if selected {
        ("[x]", Color::Green)
    } else {
        ("[ ]", Color::DarkGray)
    };

    Line::from(vec![
        Span::raw("    "),
        Span::styled(key.to_string(), Style::default().fg(Color::Yellow)),
        Span::raw(". "),
        Span::styled(mark, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::raw(label.to_string()),
    ])
}

fn render_filters(f: &mut Frame, area: Rect, app: &App) {
    let predicate = app.session.predicate();
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled("  🔍 Select Region:", heading)),
    ];

    for (i, region) in Region::ALL.iter().enumerate() {
        let key = char::from(b'1' + i as u8);
        content.push(checkbox_line(
            key,
            region.as_str(),
            predicate.selected_regions.contains(region),
        ));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled("  🔍 Select Category:", heading)));

    for (i, category) in Category::ALL.iter().enumerate() {
        let key = char::from(b'5' + i as u8);
        content.push(checkbox_line(
            key,
            category.as_str(),
            predicate.selected_categories.contains(category),
        ));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Hint: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)),
        Span::styled(
            "1-7 toggle, a select all, c clear",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    ]));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filter Options "),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.row_count()),
        Style::default().fg(Color::Cyan),
    )];

    if app.view.is_empty() {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled("NO DATA", Style::default().fg(Color::Red)));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("1-7", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Filter | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Fast | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use superstore_analytics::RecordStore;

    fn app() -> App {
        let store = RecordStore::new(60, chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).with_seed(5);
        App::new(DashboardSession::new(store))
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Overview;
        for _ in 0..4 {
            page = page.next();
        }
        assert_eq!(page, Page::Overview);
        assert_eq!(Page::Overview.previous(), Page::Filters);
    }

    #[test]
    fn test_clear_filter_yields_no_data() {
        let mut app = app();
        assert_eq!(app.row_count(), 60);
        assert_eq!(app.state.selected(), Some(0));

        app.clear_filter();
        assert!(app.view.is_empty());
        assert_eq!(app.state.selected(), None);

        app.select_all();
        assert_eq!(app.row_count(), 60);
    }

    #[test]
    fn test_toggle_region_recomputes_view() {
        let mut app = app();
        app.toggle_region(Region::East);

        let snapshot = app.view.snapshot().unwrap();
        assert!(snapshot.records.iter().all(|r| r.region != Region::East));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app();
        app.previous();
        assert_eq!(app.state.selected(), Some(59));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.page_down();
        assert_eq!(app.state.selected(), Some(20));
        app.page_up();
        assert_eq!(app.state.selected(), Some(0));
    }
}
