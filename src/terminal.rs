// SPDX-License-Identifier: GPL-3.0-only

//! Terminal host for the camera component
//!
//! Renders the 240x300 device screen to the terminal using Unicode
//! half-block characters, maps keys and the mouse wheel onto component
//! messages and rotary events, and runs returned tasks on a tokio runtime.

use crate::app::{CameraApp, Message, Notice, Screen, Task};
use crate::backends::camera::PermissionState;
use crate::config::Config;
use crate::constants::{get_resolution_label, timing, viewport};
use crate::egress::QrImage;
use crate::input::{Dispatch, RotaryEvent, RotaryInput};
use crate::pipelines::photo::FilterChain;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::channel::mpsc;
use image::RgbaImage;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the camera in the terminal until the user quits
///
/// Setting changes are written back to `config_path` when one is given.
pub fn run(
    config: Config,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &runtime, config, config_path);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// Runs tasks and collects their messages for the next loop iteration
struct TaskRunner<'a> {
    runtime: &'a tokio::runtime::Runtime,
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl<'a> TaskRunner<'a> {
    fn new(runtime: &'a tokio::runtime::Runtime) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self {
            runtime,
            sender,
            receiver,
        }
    }

    fn spawn(&self, task: Task<Message>) {
        for future in task.into_futures() {
            let sender = self.sender.clone();
            self.runtime.spawn(async move {
                let message = future.await;
                if sender.unbounded_send(message).is_err() {
                    debug!("Task finished after the terminal closed");
                }
            });
        }
    }

    fn try_next(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }
}

/// Decoded gallery photo, cached while it stays selected
struct GalleryImage {
    id: u64,
    image: RgbaImage,
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &tokio::runtime::Runtime,
    config: Config,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = CameraApp::from_config(config);
    if let Some(path) = config_path {
        app = app.with_config_path(path);
    }
    let mut rotary = RotaryInput::new();
    let mut tasks = TaskRunner::new(runtime);
    let mut gallery: Option<GalleryImage> = None;

    tasks.spawn(app.mount(&mut rotary));

    loop {
        while let Some(message) = tasks.try_next() {
            let task = app.update(message, Instant::now());
            tasks.spawn(task);
        }
        tasks.spawn(app.update(Message::Tick, Instant::now()));

        refresh_gallery(&app, &mut gallery);

        let now = Instant::now();
        terminal.draw(|f| draw(f, &app, gallery.as_ref(), now))?;

        if !event::poll(timing::TICK_INTERVAL)? {
            continue;
        }

        let message = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if is_quit(&key) {
                    break;
                }
                key_message(&app, &mut rotary, key)
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => rotate(&mut rotary, RotaryEvent::Forward),
                MouseEventKind::ScrollUp => rotate(&mut rotary, RotaryEvent::Backward),
                _ => None,
            },
            _ => None,
        };

        if let Some(message) = message {
            let task = app.update(message, Instant::now());
            tasks.spawn(task);
        }
    }

    app.unmount(&mut rotary);
    info!("Terminal closed");
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('q')
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Publish a rotary event; consumed events are delivered on the next tick
fn rotate(rotary: &mut RotaryInput, event: RotaryEvent) -> Option<Message> {
    match rotary.dispatch(event) {
        Dispatch::Consumed => Some(Message::Tick),
        Dispatch::Ignored => None,
    }
}

fn key_message(app: &CameraApp, rotary: &mut RotaryInput, key: KeyEvent) -> Option<Message> {
    let selected = app.selected_photo().map(|photo| photo.id());

    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(Message::Shutter),
        KeyCode::Right => rotate(rotary, RotaryEvent::Forward),
        KeyCode::Left => rotate(rotary, RotaryEvent::Backward),
        KeyCode::Up => Some(Message::GalleryStep(-1)),
        KeyCode::Down => Some(Message::GalleryStep(1)),
        KeyCode::Char('f') => Some(Message::ToggleFlash),
        KeyCode::Char('r') => Some(Message::ReloadFilm),
        KeyCode::Char('g') => Some(match app.screen() {
            Screen::Viewfinder => Message::OpenGallery,
            Screen::Gallery => Message::CloseGallery,
        }),
        KeyCode::Char('s') => selected.map(Message::ExportPhoto),
        KeyCode::Char('w') => selected.map(Message::DownloadPhoto),
        KeyCode::Char('u') => selected.map(Message::UploadPhoto),
        KeyCode::Char('U') => Some(Message::UploadRoll),
        KeyCode::Char('c') => Some(Message::RestartCamera),
        KeyCode::Char('t') => Some(Message::TapToPlay),
        KeyCode::Char('d') => Some(Message::DebugTap),
        KeyCode::Esc => {
            if app.qr().is_some() {
                Some(Message::DismissQr)
            } else if app.notice().is_some() {
                Some(Message::DismissNotice)
            } else if app.screen() == Screen::Gallery {
                Some(Message::CloseGallery)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn refresh_gallery(app: &CameraApp, cache: &mut Option<GalleryImage>) {
    let Some(photo) = app.selected_photo() else {
        *cache = None;
        return;
    };
    if cache.as_ref().is_some_and(|c| c.id == photo.id()) {
        return;
    }
    match image::load_from_memory(photo.jpeg()) {
        Ok(decoded) => {
            *cache = Some(GalleryImage {
                id: photo.id(),
                image: decoded.to_rgba8(),
            })
        }
        Err(e) => {
            warn!(id = photo.id(), error = %e, "Failed to decode photo for display");
            *cache = None;
        }
    }
}

/// Largest area with the device aspect ratio, centered
///
/// A half-block cell shows two square-ish pixels stacked, so one row covers
/// two device pixels vertically.
fn device_area(area: Rect) -> Rect {
    let aspect = viewport::WIDTH as f64 / viewport::HEIGHT as f64;
    let max_w = area.width as f64;
    let max_h = (area.height as f64) * 2.0;

    let (w, h) = if max_w / max_h > aspect {
        (max_h * aspect, max_h)
    } else {
        (max_w, max_w / aspect)
    };
    let width = (w as u16).max(1).min(area.width);
    let height = ((h / 2.0) as u16).max(1).min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw(f: &mut Frame, app: &CameraApp, gallery: Option<&GalleryImage>, now: Instant) {
    let area = f.area();
    let device = device_area(Rect {
        height: area.height.saturating_sub(1),
        ..area
    });

    // Screen content, status on the last device row
    let screen = Rect {
        height: device.height.saturating_sub(1),
        ..device
    };
    let status = Rect {
        y: device.y + screen.height,
        height: 1,
        ..device
    };

    match app.screen() {
        Screen::Viewfinder => draw_viewfinder(f, app, screen, now),
        Screen::Gallery => draw_gallery(f, app, gallery, screen),
    }
    f.render_widget(
        StatusBar {
            message: &status_line(app, now),
        },
        status,
    );

    if app.debug_visible() {
        draw_debug(f, app, screen);
    }
    if let Some(notice) = app.notice() {
        draw_notice(f, notice, screen);
    }
    if let Some(upload) = app.qr() {
        draw_qr(f, &upload.qr, area);
    }

    let help = Rect {
        y: area.height.saturating_sub(1),
        height: 1,
        ..area
    };
    f.render_widget(
        StatusBar {
            message: help_line(app),
        },
        help,
    );
}

fn draw_viewfinder(f: &mut Frame, app: &CameraApp, area: Rect, now: Instant) {
    if app.flash_active(now) {
        f.render_widget(Fill(Color::White), area);
        return;
    }
    if app.shutter_active(now) {
        f.render_widget(Fill(Color::Black), area);
        return;
    }

    if let PermissionState::Denied { kind, message } = app.permission() {
        let text = format!("Camera not permitted\n{}: {}\n\nc: retry", kind.name(), message);
        draw_centered_text(f, &text, area);
        return;
    }
    if app.needs_tap_to_play() {
        draw_centered_text(f, "Preview paused\n\nt: tap to play", area);
        return;
    }

    let Some(frame) = app.surface().current_frame() else {
        draw_centered_text(f, "Waiting for camera...", area);
        return;
    };

    let chain = app.current_filter().chain();
    let mirror = app.config().mirror_preview;
    let view = PixelView {
        width: frame.width,
        height: frame.height,
        chain: &chain,
        sample: &|x, y| {
            let x = if mirror { frame.width - 1 - x } else { x };
            frame.pixel_rgb(x, y)
        },
    };
    f.render_widget(view, area);
}

fn draw_gallery(f: &mut Frame, app: &CameraApp, gallery: Option<&GalleryImage>, area: Rect) {
    let Some(GalleryImage { image, .. }) = gallery else {
        let text = if app.film().photos().is_empty() {
            "No photos on this roll"
        } else {
            "Developing..."
        };
        draw_centered_text(f, text, area);
        return;
    };

    let identity = FilterChain::identity();
    let view = PixelView {
        width: image.width(),
        height: image.height(),
        chain: &identity,
        sample: &|x, y| {
            let p = image.get_pixel(x.min(image.width() - 1), y.min(image.height() - 1));
            (p[0], p[1], p[2])
        },
    };
    f.render_widget(view, area);
}

fn draw_centered_text(f: &mut Frame, text: &str, area: Rect) {
    let lines = text.lines().count() as u16;
    let rect = Rect {
        y: area.y + area.height.saturating_sub(lines) / 2,
        height: lines.min(area.height),
        ..area
    };
    f.render_widget(Fill(Color::Black), area);
    f.render_widget(
        Paragraph::new(text.to_string())
            .alignment(ratatui::layout::Alignment::Center)
            .style(Style::default().fg(Color::Gray)),
        rect,
    );
}

fn draw_debug(f: &mut Frame, app: &CameraApp, area: Rect) {
    let rect = Rect {
        y: area.y + area.height / 2,
        height: area.height - area.height / 2,
        ..area
    };
    let text: Vec<String> = app.debug_log().lines().map(ToString::to_string).collect();
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(text.join("\n"))
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Green).bg(Color::Black))
            .block(Block::default().borders(Borders::TOP).title("debug")),
        rect,
    );
}

fn draw_notice(f: &mut Frame, notice: &Notice, area: Rect) {
    let color = match notice {
        Notice::Info(_) => Color::Blue,
        Notice::Error(_) => Color::Red,
    };
    let rect = Rect {
        height: 3.min(area.height),
        ..area
    };
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(format!("{} (Esc)", notice.text()))
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::White).bg(color)),
        rect,
    );
}

fn draw_qr(f: &mut Frame, qr: &QrImage, area: Rect) {
    let code = qr.to_text();
    let rows = code.lines().count() as u16 + 2;
    let cols = code.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 2;
    let width = cols.max(qr.text().len().min(area.width as usize) as u16 + 2);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(rows + 1) / 2,
        width: width.min(area.width),
        height: (rows + 1).min(area.height),
    };
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(format!("{}\n{}", code, qr.text()))
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("scan (Esc)")),
        rect,
    );
}

fn status_line(app: &CameraApp, now: Instant) -> String {
    match app.screen() {
        Screen::Viewfinder => {
            let mut msg = format!(
                "{} | {}/{}",
                app.current_filter().label,
                app.film().remaining(),
                app.film().initial()
            );
            if app.flash_enabled() {
                msg.push_str(" | flash");
            }
            if let Some(frame) = app.surface().current_frame()
                && let Some(label) = get_resolution_label(frame.width)
            {
                msg.push_str(" | ");
                msg.push_str(label);
            }
            if app.is_developing() || app.shutter_active(now) {
                msg.push_str(" | developing");
            }
            msg
        }
        Screen::Gallery => match app.selected_photo() {
            Some(photo) => {
                let mut msg = format!(
                    "{}/{} {} {}",
                    app.gallery_index() + 1,
                    app.film().photos().len(),
                    photo.preset().label,
                    photo.time_label()
                );
                if app.egress_in_flight() {
                    msg.push_str(" | sending");
                }
                msg
            }
            None => "Empty roll".to_string(),
        },
    }
}

fn help_line(app: &CameraApp) -> &'static str {
    match app.screen() {
        Screen::Viewfinder => {
            if app.can_reload() {
                "space shoot | </> filter | f flash | g gallery | r reload | c restart | q quit"
            } else {
                "space shoot | </> filter | f flash | g gallery | c restart | q quit"
            }
        }
        Screen::Gallery => {
            "up/down browse | s share | w save | u upload | U upload roll | r reload | g back"
        }
    }
}

/// Solid fill
struct Fill(Color);

impl Widget for Fill {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ');
                    cell.set_bg(self.0);
                }
            }
        }
    }
}

/// Renders a raster using half-block characters, cropped to fill the area
struct PixelView<'a> {
    width: u32,
    height: u32,
    chain: &'a FilterChain,
    sample: &'a dyn Fn(u32, u32) -> (u8, u8, u8),
}

impl PixelView<'_> {
    fn color(&self, x: u32, y: u32) -> Color {
        let (r, g, b) = (self.sample)(x, y);
        let [r, g, b] = self.chain.apply_pixel([r, g, b]);
        Color::Rgb(r, g, b)
    }
}

impl Widget for PixelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.width == 0 || self.height == 0 || area.width == 0 || area.height == 0 {
            return;
        }

        // Cover the device screen, cropping the longer side like object-fit: cover
        let target_w = area.width as f64;
        let target_h = (area.height as f64) * 2.0;
        let scale = (self.width as f64 / target_w).min(self.height as f64 / target_h);
        let x_offset = (self.width as f64 - target_w * scale) / 2.0;
        let y_offset = (self.height as f64 - target_h * scale) / 2.0;

        // Each cell: upper pixel as fg of '▀', lower pixel as bg
        for ty in 0..area.height {
            for tx in 0..area.width {
                let src_x = (x_offset + tx as f64 * scale) as u32;
                let src_y_top = (y_offset + ty as f64 * 2.0 * scale) as u32;
                let src_y_bottom = (y_offset + (ty as f64 * 2.0 + 1.0) * scale) as u32;

                let top = self.color(src_x.min(self.width - 1), src_y_top.min(self.height - 1));
                let bottom =
                    self.color(src_x.min(self.width - 1), src_y_bottom.min(self.height - 1));

                if let Some(cell) = buf.cell_mut((area.x + tx, area.y + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_area_keeps_aspect() {
        let area = device_area(Rect::new(0, 0, 200, 50));
        // 50 rows = 100 px tall, so 80 px wide
        assert_eq!(area.height, 50);
        assert_eq!(area.width, 80);
        assert_eq!(area.x, 60);
    }

    #[test]
    fn test_device_area_narrow_terminal() {
        let area = device_area(Rect::new(0, 0, 40, 100));
        assert_eq!(area.width, 40);
        assert_eq!(area.height, 25);
    }

    #[test]
    fn test_pixel_view_applies_filter() {
        let chain: FilterChain = "grayscale(1)".parse().unwrap();
        let view = PixelView {
            width: 2,
            height: 2,
            chain: &chain,
            sample: &|_, _| (255, 0, 0),
        };
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 1));
        view.render(Rect::new(0, 0, 2, 1), &mut buf);
        let cell = &buf[(0, 0)];
        match cell.fg {
            Color::Rgb(r, g, b) => assert!(r == g && g == b),
            other => panic!("unexpected color {:?}", other),
        }
    }
}
