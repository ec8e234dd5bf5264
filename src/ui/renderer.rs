/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into the `front` buffer (grid of Cell)
///   2. Compare each cell with the `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. Batch everything with `queue!`, flush once
///   5. Swap front/back
///
/// ## Viewport
///
/// The simulation works in pixels; the terminal in cells. The map area is
/// scaled so the whole `VIEW_W x VIEW_H` camera window fits the terminal:
/// one cell covers `VIEW_W / cols` by `VIEW_H / rows` pixels. Every entity
/// occupies at least one cell, so nothing vanishes on a small terminal.
///
/// Composition is pure (world in, cells out); only `render` touches stdout.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{BossMode, EliteState, FlamePhase, MonsterState, FLAME_W};
use crate::domain::physics::Rect;
use crate::domain::rules;
use crate::sim::level::{VIEW_H, VIEW_W};
use crate::sim::world::{Phase, Progression, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell. Using the same RGB for
    /// `Clear` and cells keeps VTE terminals from showing row seams.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Differs from any real cell, so every position is re-emitted.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Layout ──

const HUD_ROW: usize = 0;
const BAR_ROW: usize = 1;
const MAP_ROW: usize = 2;
/// HUD + bars above the map, message + help below.
const RESERVED_ROWS: usize = MAP_ROW + 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const GROUND_FG: Color = Color::Rgb { r: 120, g: 90, b: 60 };
const LEDGE_FG: Color = Color::Rgb { r: 150, g: 150, b: 160 };
const DOOR_FG: Color = Color::Rgb { r: 150, g: 60, b: 40 };
const KEY_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const PLAYER_FG: Color = Color::Rgb { r: 80, g: 220, b: 255 };
const MONSTER_FG: Color = Color::Rgb { r: 90, g: 200, b: 90 };
const ELITE_FG: Color = Color::Rgb { r: 190, g: 110, b: 255 };
const BOSS_FG: Color = Color::Rgb { r: 230, g: 60, b: 50 };
const FIRE_FG: Color = Color::Rgb { r: 255, g: 150, b: 40 };
const HURT_FG: Color = Color::White;

const HELP: &str = " ←→/AD:Move  ↑/W/Space:Jump  ↓/S:Crouch  J:Attack  E:Door  R:Restart  Esc:Quit";

/// Maps world pixels to map-area cells for the current camera.
#[derive(Clone, Copy, Debug)]
struct Viewport {
    cols: usize,
    rows: usize,
    /// Pixels per cell.
    sx: f32,
    sy: f32,
    cam_x: f32,
}

/// Inclusive cell ranges covered by a rectangle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Span {
    c0: usize,
    c1: usize,
    r0: usize,
    r1: usize,
}

impl Viewport {
    fn new(cols: usize, rows: usize, cam_x: f32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Viewport { cols, rows, sx: VIEW_W / cols as f32, sy: VIEW_H / rows as f32, cam_x }
    }

    /// Cells covered by `r`, clipped to the viewport. `None` when off-screen.
    fn span(&self, r: &Rect) -> Option<Span> {
        let left = (r.x - self.cam_x) / self.sx;
        let right = (r.right() - self.cam_x) / self.sx;
        let top = r.y / self.sy;
        let bottom = r.bottom() / self.sy;
        if right <= 0.0 || bottom <= 0.0 || left >= self.cols as f32 || top >= self.rows as f32 {
            return None;
        }
        let c0 = left.max(0.0).floor() as usize;
        let r0 = top.max(0.0).floor() as usize;
        let c1 = ((right.ceil() as usize).saturating_sub(1)).max(c0).min(self.cols - 1);
        let r1 = ((bottom.ceil() as usize).saturating_sub(1)).max(r0).min(self.rows - 1);
        Some(Span { c0, c1, r0, r1 })
    }
}

fn bar(value: u32, max: u32, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((value.min(max) as usize * width) + max as usize - 1) / max as usize
    };
    let mut s = String::with_capacity(width * 3);
    s.extend(std::iter::repeat('█').take(filled));
    s.extend(std::iter::repeat('░').take(width - filled));
    s
}

fn status_text(p: Progression) -> &'static str {
    match p {
        Progression::NoKey => "Find the key",
        Progression::KeyHeld => "[KEY] Open the door",
        Progression::DoorOpen => "Door open",
        Progression::BossDormant => "The dragon stirs...",
        Progression::BossActive => "Slay the dragon!",
        Progression::Won => "VICTORY",
        Progression::Lost => "DEFEATED",
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        compose(&mut self.front, world);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal's own.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

// ══════════════════════════════════════════════════════════════
// Composition
// ══════════════════════════════════════════════════════════════

fn compose(buf: &mut FrameBuffer, w: &WorldState) {
    if buf.height <= RESERVED_ROWS || buf.width == 0 {
        buf.put_str(0, 0, "terminal too small", Color::White, Color::Reset);
        return;
    }
    let view = Viewport::new(buf.width, buf.height - RESERVED_ROWS, w.camera.x);

    compose_hud(buf, w);
    compose_map(buf, w, &view);

    let msg_row = MAP_ROW + view.rows;
    if w.message_timer > 0 && !w.message.is_empty() {
        buf.fill_row(msg_row, MSG_BG);
        buf.put_str(0, msg_row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
    }
    buf.put_str(0, msg_row + 1, HELP, Color::DarkGrey, Color::Reset);

    if w.is_over() {
        compose_outcome(buf, w, &view);
    }
}

fn compose_hud(buf: &mut FrameBuffer, w: &WorldState) {
    let p = &w.player;
    let hud = format!(
        " Lv {}  EXP {:<3}  Kills {:<3}  HP {:>3}/{:<3}  {} ",
        p.level, p.exp, p.kills, p.hp, p.max_hp, status_text(w.progression()),
    );
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

    let hp = format!(" HP  {}", bar(p.hp, p.max_hp, 20));
    buf.put_str(0, BAR_ROW, &hp, Color::Rgb { r: 80, g: 220, b: 120 }, Color::Reset);
    if let Some((hp, max)) = w.boss_health() {
        let boss = format!("DRAGON {} {:>3}/{}", bar(hp, max, 24), hp, max);
        let x = buf.width.saturating_sub(boss.chars().count() + 1);
        buf.put_str(x, BAR_ROW, &boss, BOSS_FG, Color::Reset);
    }
}

fn fill(buf: &mut FrameBuffer, view: &Viewport, r: &Rect, ch: char, fg: Color) {
    let Some(s) = view.span(r) else { return };
    for row in s.r0..=s.r1 {
        for col in s.c0..=s.c1 {
            buf.set(col, MAP_ROW + row, Cell::new(ch, fg, Color::Reset));
        }
    }
}

/// Back-to-front: terrain, door, key, hazards, enemies, shots, player.
fn compose_map(buf: &mut FrameBuffer, w: &WorldState, view: &Viewport) {
    for plat in &w.platforms {
        if plat.h >= 40.0 {
            fill(buf, view, plat, '▓', GROUND_FG);
        } else {
            fill(buf, view, plat, '▀', LEDGE_FG);
        }
    }

    let door_ch = if w.door.open { '░' } else { '█' };
    fill(buf, view, &w.door.rect, door_ch, DOOR_FG);

    if let Some(key) = w.key.as_ref().filter(|k| k.active && !k.collected) {
        fill(buf, view, &key.rect, 'K', KEY_FG);
    }

    for flame in &w.flames {
        match flame.phase {
            FlamePhase::Warning { ticks_left } => {
                let marker = Rect::new(flame.x, flame.floor_y - 6.0, FLAME_W, 6.0);
                let fg = if ticks_left % 8 < 4 { FIRE_FG } else { Color::DarkYellow };
                fill(buf, view, &marker, '^', fg);
            }
            FlamePhase::Pillar { .. } => {
                if let Some(hb) = flame.hitbox() {
                    fill(buf, view, &hb, '▲', BOSS_FG);
                }
            }
        }
    }

    for m in &w.monsters {
        let fg = match m.state {
            MonsterState::Patrol => MONSTER_FG,
            MonsterState::Knocked { .. } => HURT_FG,
            MonsterState::Respawning { .. } => continue,
        };
        fill(buf, view, &m.body.rect(), 'm', fg);
    }

    let e = &w.elite;
    match e.state {
        EliteState::Dead => {}
        EliteState::Hurt { .. } => fill(buf, view, &e.body.rect(), 'E', HURT_FG),
        EliteState::Windup { .. } => fill(buf, view, &e.body.rect(), 'E', FIRE_FG),
        _ => fill(buf, view, &e.body.rect(), 'E', ELITE_FG),
    }

    if let Some(boss) = &w.boss {
        let fg = match boss.mode {
            BossMode::Dormant { .. } | BossMode::Dead => Color::DarkGrey,
            BossMode::Charge(_) | BossMode::Fireball { .. } | BossMode::Flame => FIRE_FG,
            BossMode::Idle => BOSS_FG,
        };
        fill(buf, view, &boss.body.rect(), 'D', fg);
    }

    for shot in &w.elite_bolts {
        fill(buf, view, &shot.body.rect(), '*', ELITE_FG);
    }
    for shot in &w.fireballs {
        fill(buf, view, &shot.body.rect(), 'o', FIRE_FG);
    }

    compose_player(buf, w, view);
}

fn compose_player(buf: &mut FrameBuffer, w: &WorldState, view: &Viewport) {
    let p = &w.player;
    // Blink while invulnerable.
    if p.is_invulnerable() && (w.tick / 4) % 2 == 1 && !w.is_over() {
        return;
    }
    if let Some(hit) = rules::attack_box(p) {
        fill(buf, view, &hit, '─', Color::White);
    }
    let fg = if w.phase == Phase::Lost { Color::DarkGrey } else { PLAYER_FG };
    fill(buf, view, &p.body.rect(), '@', fg);
}

fn compose_outcome(buf: &mut FrameBuffer, w: &WorldState, view: &Viewport) {
    let (title, fg) = match w.phase {
        Phase::Won => ("★  THE DRAGON IS SLAIN  ★", KEY_FG),
        _ => ("✕  YOU HAVE FALLEN  ✕", BOSS_FG),
    };
    let lines = [
        title.to_string(),
        format!("Level {}   Kills {}", w.player.level, w.player.kills),
        "R / Start: play again    Esc: quit".to_string(),
    ];
    let box_w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 6;
    let box_h = lines.len() + 2;
    let x0 = buf.width.saturating_sub(box_w) / 2;
    let y0 = MAP_ROW + view.rows.saturating_sub(box_h) / 2;
    let panel = Color::Rgb { r: 40, g: 40, b: 40 };

    for y in y0..y0 + box_h {
        for x in x0..(x0 + box_w).min(buf.width) {
            buf.set(x, y, Cell::new(' ', Color::White, panel));
        }
    }
    for (i, line) in lines.iter().enumerate() {
        let lx = x0 + (box_w - line.chars().count()) / 2;
        let lfg = if i == 0 { fg } else { Color::White };
        buf.put_str(lx, y0 + 1 + i, line, lfg, panel);
    }
}
