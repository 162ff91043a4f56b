//! One render function per dashboard view.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
};

use groflow_engine::groflow_core::{Campaign, MonthlyRoadmap};
use groflow_engine::groflow_types::View;
use groflow_engine::{App, FormId, InputMode};

use crate::theme::{Palette, styles};
use crate::{draw_form, form_height};

pub(crate) fn draw_view(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let block = panel(app.view().title(), palette, false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.view() {
        View::Home => draw_home(frame, app, inner, palette),
        View::Assistant => draw_assistant(frame, app, inner, palette),
        View::Roadmap => draw_roadmap(frame, app, inner, palette),
        View::Tracker => draw_tracker(frame, app, inner, palette),
        View::Marketplace => draw_marketplace(frame, app, inner, palette),
        View::Investor => draw_investor(frame, app, inner, palette),
        View::Settings => draw_settings(frame, app, inner, palette),
    }
}

fn panel<'a>(title: &'a str, palette: &Palette, focused: bool) -> Block<'a> {
    Block::default()
        .title(Span::styled(format!(" {title} "), styles::title(palette)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette, focused))
        .style(Style::default().bg(palette.bg_panel))
}

fn is_editing(app: &App, id: FormId) -> bool {
    app.mode() == InputMode::Editing(id)
}

fn muted<'a>(text: impl Into<String>, palette: &Palette) -> Line<'a> {
    Line::from(Span::styled(
        text.into(),
        Style::default().fg(palette.text_muted),
    ))
}

/// First row to draw so `selected` stays inside `height` rows.
fn scroll_start(selected: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    selected.saturating_sub(height - 1)
}

fn split_vertical<const N: usize>(area: Rect, constraints: [Constraint; N]) -> [Rect; N] {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .areas(area)
}

fn draw_form_for(frame: &mut Frame, app: &App, id: FormId, area: Rect, palette: &Palette) {
    draw_form(frame, app.form(id), area, is_editing(app, id), palette);
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let tool = |key: &'static str, name: &'static str, blurb: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key}  "), styles::key_highlight(palette)),
            Span::styled(name, Style::default().fg(palette.text_primary)),
            Span::styled(format!("  {blurb}"), Style::default().fg(palette.text_secondary)),
        ])
    };

    let session = app.session();
    let lines = vec![
        Line::from(Span::styled("Grow your business, one week at a time.", styles::title(palette))),
        Line::from(""),
        muted(
            "GroFlow turns your budget, time and goal into a plan, keeps you honest about it, \
             and connects you with neighbours and investors who back local businesses.",
            palette,
        ),
        Line::from(""),
        tool("2", "AI Assistant", "quick actions for this week"),
        tool("3", "Monthly Roadmap", "a four-week plan you can load into the tracker"),
        tool("4", "Adaptive Tracker", "tick off tasks; recalibrate after a setback"),
        tool("5", "Fundraising", "post a campaign and vouch for others"),
        tool("6", "Investor", "fund campaigns the community already trusts"),
        Line::from(""),
        muted(
            format!(
                "{} campaigns live │ {} to vouch │ {} investor liquidity",
                session.campaigns().len(),
                session.ledger().balance(),
                session.pool().liquidity()
            ),
            palette,
        ),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn draw_assistant(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let [form_area, output_area] = split_vertical(
        area,
        [Constraint::Length(form_height(app.form(FormId::Plan))), Constraint::Min(1)],
    );
    draw_form_for(frame, app, FormId::Plan, form_area, palette);

    let text = match app.quick_actions() {
        Some(text) => {
            Paragraph::new(text.to_string()).style(Style::default().fg(palette.text_primary))
        }
        None => Paragraph::new(muted(
            "Fill in your plan (e) and press g for this week's quick actions.",
            palette,
        )),
    };
    frame.render_widget(
        text.wrap(Wrap { trim: false })
            .block(panel("Quick actions", palette, false)),
        output_area,
    );
}

fn roadmap_lines<'a>(roadmap: &MonthlyRoadmap, palette: &Palette) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for week in &roadmap.weeks {
        lines.push(Line::from(vec![
            Span::styled(format!("Week {}", week.week), styles::title(palette)),
            Span::styled(
                format!("  {}", week.focus),
                Style::default().fg(palette.accent),
            ),
        ]));
        for task in &week.tasks {
            lines.push(Line::from(Span::styled(
                format!("  • {task}"),
                Style::default().fg(palette.text_primary),
            )));
        }
        lines.push(Line::from(""));
    }
    lines.push(muted(
        format!("{} tasks │ press l to load them into the tracker", roadmap.task_count()),
        palette,
    ));
    lines
}

fn draw_roadmap(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let [form_area, output_area] = split_vertical(
        area,
        [Constraint::Length(form_height(app.form(FormId::Plan))), Constraint::Min(1)],
    );
    draw_form_for(frame, app, FormId::Plan, form_area, palette);

    let lines = match app.roadmap() {
        Some(Ok(roadmap)) => roadmap_lines(roadmap, palette),
        Some(Err(malformed)) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    malformed.to_string(),
                    Style::default().fg(palette.error),
                )),
                Line::from(""),
            ];
            lines.extend(malformed.raw.lines().map(|l| {
                Line::from(Span::styled(
                    l.to_string(),
                    Style::default().fg(palette.text_secondary),
                ))
            }));
            lines
        }
        None => vec![muted(
            "Fill in your plan (e) and press g for a four-week roadmap.",
            palette,
        )],
    };
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(panel("Roadmap", palette, false)),
        output_area,
    );
}

fn draw_tracker(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let recalibration_rows = if app.recalibration().is_some() {
        Constraint::Percentage(40)
    } else {
        Constraint::Length(0)
    };
    let [gauge_area, list_area, task_form, setback_form, output_area] = split_vertical(
        area,
        [
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(form_height(app.form(FormId::NewTask))),
            Constraint::Length(form_height(app.form(FormId::Setback))),
            recalibration_rows,
        ],
    );

    let threshold = app.session().recalibration_threshold_percent();
    let (ratio, label, color) = match app.completion_percent() {
        Some(rate) => {
            let color = if app.recalibration_available() {
                palette.warning
            } else {
                palette.success
            };
            (f64::from(rate.min(100)) / 100.0, format!("{rate}% complete"), color)
        }
        None => (0.0, "No tasks yet".to_string(), palette.text_muted),
    };
    let gauge = Gauge::default()
        .block(panel("Completion", palette, false))
        .gauge_style(Style::default().fg(color).bg(palette.bg_highlight))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, gauge_area);

    let tasks = app.session().tracker().tasks();
    let height = usize::from(list_area.height.saturating_sub(2));
    let start = scroll_start(app.tracker_selected(), height);
    let mut lines: Vec<Line> = tasks
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(index, task)| {
            let check = if task.done { "[x]" } else { "[ ]" };
            let week = task.week.map(|w| format!("W{w} ")).unwrap_or_default();
            let style = if index == app.tracker_selected() {
                styles::selected(palette)
            } else if task.done {
                Style::default()
                    .fg(palette.text_muted)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(palette.text_primary)
            };
            Line::from(Span::styled(format!("{check} {week}{}", task.text), style))
        })
        .collect();
    if tasks.is_empty() {
        lines.push(muted(
            "Add a task with a, or load a roadmap from view 3.",
            palette,
        ));
    } else if app.recalibration_available() {
        lines.push(Line::from(Span::styled(
            format!("Below {threshold}%: describe the setback (s) and press r to recalibrate."),
            Style::default().fg(palette.warning),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).block(panel("Tasks", palette, false)),
        list_area,
    );

    draw_form_for(frame, app, FormId::NewTask, task_form, palette);
    draw_form_for(frame, app, FormId::Setback, setback_form, palette);

    if let Some(text) = app.recalibration() {
        frame.render_widget(
            Paragraph::new(text.to_string())
                .style(Style::default().fg(palette.text_primary))
                .wrap(Wrap { trim: false })
                .block(panel("Recalibrated plan", palette, false)),
            output_area,
        );
    }
}

fn campaign_line<'a>(campaign: &Campaign, selected: bool, palette: &Palette) -> Line<'a> {
    let style = if selected {
        styles::selected(palette)
    } else {
        Style::default().fg(palette.text_primary)
    };
    let mut spans = vec![
        Span::styled(
            format!("{:<5}", campaign.id.to_string()),
            Style::default().fg(palette.text_muted),
        ),
        Span::styled(campaign.name.to_string(), style),
        Span::styled(
            format!("  {}/{}", campaign.points.value(), campaign.goal),
            Style::default().fg(palette.text_secondary),
        ),
    ];
    if campaign.funded_by_investor {
        spans.push(Span::styled("  funded", Style::default().fg(palette.success)));
    }
    Line::from(spans)
}

fn draw_marketplace(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let campaigns = app.session().campaigns();
    let height = usize::from(columns[0].height.saturating_sub(2));
    let start = scroll_start(app.marketplace_selected(), height);
    let mut lines: Vec<Line> = campaigns
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(index, c)| campaign_line(c, index == app.marketplace_selected(), palette))
        .collect();
    if campaigns.is_empty() {
        lines.push(muted("No campaigns yet. Press n to post one.", palette));
    }
    frame.render_widget(
        Paragraph::new(lines).block(panel("Campaigns", palette, false)),
        columns[0],
    );

    if is_editing(app, FormId::Campaign) {
        let [form_area, _] = split_vertical(
            columns[1],
            [Constraint::Length(form_height(app.form(FormId::Campaign))), Constraint::Min(0)],
        );
        draw_form_for(frame, app, FormId::Campaign, form_area, palette);
        return;
    }

    let [detail_area, gauge_area, warning_area] = split_vertical(
        columns[1],
        [Constraint::Min(3), Constraint::Length(3), Constraint::Length(3)],
    );

    let Some(campaign) = app.selected_campaign() else {
        frame.render_widget(Paragraph::new(muted("Nothing selected", palette)), detail_area);
        return;
    };

    let rules = campaigns.rules();
    let mut detail = vec![
        Line::from(Span::styled(campaign.name.to_string(), styles::title(palette))),
        Line::from(Span::styled(
            format!("by {}", campaign.owner),
            Style::default().fg(palette.text_secondary),
        )),
        Line::from(""),
    ];
    if !campaign.description.is_empty() {
        detail.push(Line::from(campaign.description.clone()));
        detail.push(Line::from(""));
    }
    if let Some(image) = &campaign.image_reference {
        detail.push(muted(format!("Image: {image}"), palette));
    }
    detail.push(muted(
        format!(
            "{} vouches │ {} per vouch",
            campaign.community_vouch_count, rules.vouch_points
        ),
        palette,
    ));
    if campaign.funded_by_investor {
        detail.push(Line::from(Span::styled(
            format!("Funded by an investor: {}", campaign.investor_funding),
            Style::default().fg(palette.success),
        )));
    } else if campaigns.is_eligible(campaign) {
        detail.push(Line::from(Span::styled(
            "Eligible for investment",
            Style::default().fg(palette.accent),
        )));
    }
    frame.render_widget(
        Paragraph::new(detail)
            .wrap(Wrap { trim: false })
            .block(panel("Details", palette, false)),
        detail_area,
    );

    let gauge = Gauge::default()
        .block(panel("Trust", palette, false))
        .gauge_style(Style::default().fg(palette.primary).bg(palette.bg_highlight))
        .ratio(campaigns.progress(campaign.id).unwrap_or(0.0))
        .label(format!("{} of {}", campaign.points, campaign.goal));
    frame.render_widget(gauge, gauge_area);

    let duplicates = campaigns.duplicate_names();
    if !duplicates.is_empty() {
        let names: Vec<&str> = duplicates.keys().map(String::as_str).collect();
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("Shared names: {}", names.join(", ")),
                Style::default().fg(palette.warning),
            )))
            .wrap(Wrap { trim: true }),
            warning_area,
        );
    }
}

fn draw_investor(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let session = app.session();
    let pool = session.pool();
    let rules = pool.rules();
    let [header_area, middle_area, portfolio_area] = split_vertical(
        area,
        [Constraint::Length(2), Constraint::Min(6), Constraint::Percentage(40)],
    );

    let header = vec![
        Line::from(vec![
            Span::styled("Liquidity ", Style::default().fg(palette.text_secondary)),
            Span::styled(pool.liquidity().to_string(), styles::title(palette)),
        ]),
        muted(
            format!(
                "Invest {} to {} in campaigns with at least {} pts",
                rules.min_investment,
                rules.max_investment,
                session.campaigns().rules().investment_threshold
            ),
            palette,
        ),
    ];
    frame.render_widget(Paragraph::new(header), header_area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(middle_area);

    let height = usize::from(columns[0].height.saturating_sub(2));
    let start = scroll_start(app.investor_selected(), height);
    let mut lines: Vec<Line> = session
        .campaigns()
        .list_eligible_for_investment()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(index, c)| campaign_line(c, index == app.investor_selected(), palette))
        .collect();
    if lines.is_empty() {
        lines.push(muted("No campaign has enough community trust yet.", palette));
    }
    frame.render_widget(
        Paragraph::new(lines).block(panel("Eligible", palette, false)),
        columns[0],
    );

    let [invest_area, liquidity_area] = split_vertical(
        columns[1],
        [
            Constraint::Length(form_height(app.form(FormId::Invest))),
            Constraint::Length(form_height(app.form(FormId::Liquidity))),
        ],
    );
    draw_form_for(frame, app, FormId::Invest, invest_area, palette);
    draw_form_for(frame, app, FormId::Liquidity, liquidity_area, palette);

    let header = Row::new(["ID", "Business", "Amount", "Date", "Status"])
        .style(styles::key_highlight(palette));
    let rows: Vec<Row> = pool
        .investments()
        .iter()
        .map(|inv| {
            Row::new(vec![
                Cell::from(inv.id.to_string()),
                Cell::from(inv.business_name.clone()),
                Cell::from(inv.amount.to_string()),
                Cell::from(inv.timestamp.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(inv.status.as_str()),
            ])
            .style(Style::default().fg(palette.text_primary))
        })
        .collect();
    let title = format!(
        "Portfolio │ {} invested │ {} expected monthly at {}.{:02}%",
        pool.total_invested(),
        pool.expected_monthly_return(),
        rules.monthly_return_bps / 100,
        rules.monthly_return_bps % 100
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(14),
            Constraint::Length(17),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(panel(&title, palette, false));
    frame.render_widget(table, portfolio_area);
}

fn draw_settings(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let gateway = app.gateway();
    let key = app
        .masked_api_key()
        .unwrap_or_else(|| "not set".to_string());
    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:>10}: "), Style::default().fg(palette.text_muted)),
            Span::styled(value, Style::default().fg(palette.text_primary)),
        ])
    };
    let lines = vec![
        row("API key", key),
        row("Model", gateway.model.clone()),
        row("Endpoint", gateway.base_url.clone()),
        row(
            "Contrast",
            if app.high_contrast() { "high" } else { "standard" }.to_string(),
        ),
        Line::from(""),
        muted(
            "The key lives in memory for this session only and is never written to disk.",
            palette,
        ),
    ];

    let [info_area, form_area] = split_vertical(
        area,
        [Constraint::Length(7), Constraint::Length(form_height(app.form(FormId::Credential)))],
    );
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), info_area);
    draw_form_for(frame, app, FormId::Credential, form_area, palette);
}
