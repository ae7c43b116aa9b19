//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┬──────────────┐
//! │                                                      │  PHASE       │
//! │   stage: category list / shuffling deck /            │  hint        │
//! │          top-down orbit / spread of drawn cards      │  mode, pose  │
//! │                                                      │  [energy]    │
//! │                       ◆ pointer                      │  [grab]      │
//! │                                                      │  passages    │
//! │  status bar                                          │              │
//! └──────────────────────────────────────────────────────┴──────────────┘
//! ```
//!
//! The mouse stands in for the hand: its position drives a [`SimHand`], the
//! keyboard changes the hand shape, and clicks become taps.

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use tarot_deck::Category;

use crate::engine::{energy_fraction, FrameSnapshot, SpreadSlotView};
use crate::input::{InputMode, Tap};
use crate::orbit::CardTransform;
use crate::phase::Phase;
use crate::pose::Pose;
use crate::tracking::SimHand;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 1100;
pub const WIN_H:       usize = 640;
const PANEL_W:         usize = 320;
const STAGE_W:         usize = WIN_W - PANEL_W;
const STATUS_Y:        usize = WIN_H - 36;
const STAGE_CX:        f32   = STAGE_W as f32 / 2.0;
const STAGE_CY:        f32   = STATUS_Y as f32 / 2.0;
const ORBIT_PX:        f32   = 24.0;   // pixels per world unit, orbit view
const SPREAD_PX:       f32   = 80.0;   // pixels per world unit, spread view
const SLOT_W:          usize = 100;
const SLOT_H:          usize = 140;
const BAR_W:           usize = PANEL_W - 40;
const BAR_H:           usize = 10;
const BG_COLOR:        u32   = 0xFF120E24;
const PANEL_BG:        u32   = 0xFF1C1638;
const TEXT_BG:         u32   = 0xFF2A1F4F;
const CARD_BACK:       u32   = 0xFF4B2E83;
const CARD_FACE:       u32   = 0xFFF2E8D5;
const GOLD:            u32   = 0xFFFFD700;
const ENERGY_COLOR:    u32   = 0xFF7FD4FF;
const GRAB_COLOR:      u32   = 0xFFFF9F43;
const COOLDOWN_COLOR:  u32   = 0xFF666666;
const TEXT_COLOR:      u32   = 0xFFEEEEEE;
const DIM_TEXT:        u32   = 0xFF8A84A8;

// ════════════════════════════════════════════════════════════════════════════
// UiAction
// ════════════════════════════════════════════════════════════════════════════

/// Session-level input from the window, handed to the app each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    Choose(Category),
    SubmitQuestion,
    ToggleInputMode,
    Restart,
    Tap(Tap),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    buf:        Vec<u32>,
    sim_tx:     Sender<SimHand>,
    hand:       SimHand,
    mouse_down: bool,
    /// Screen rectangles of the laid-out slots from the last render.
    slot_rects: Vec<(usize, Rect)>,
    frame:      u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rect { x: usize, y: usize, w: usize, h: usize }

impl Rect {
    fn contains(&self, px: usize, py: usize) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimHand>) -> Result<Self, String> {
        let mut window = Window::new(
            "Gesture Deck",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        let hand = SimHand { present: true, ..SimHand::default() };
        let _ = sim_tx.send(hand);

        Ok(Visualizer {
            window,
            buf:        vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            hand,
            mouse_down: false,
            slot_rects: Vec::new(),
            frame:      0,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse. Hand shape and position go to the simulated
    /// tracker; everything else comes back as actions.
    pub fn poll_input(&mut self) -> Vec<UiAction> {
        let mut actions = Vec::new();
        if !self.window.is_open() {
            actions.push(UiAction::Quit);
            return actions;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) { actions.push(UiAction::Quit); }
        if one_shot(Key::Key1)  { actions.push(UiAction::Choose(Category::Daily)); }
        if one_shot(Key::Key2)  { actions.push(UiAction::Choose(Category::Love)); }
        if one_shot(Key::Key3)  { actions.push(UiAction::Choose(Category::Career)); }
        if one_shot(Key::Enter) { actions.push(UiAction::SubmitQuestion); }
        if one_shot(Key::M)     { actions.push(UiAction::ToggleInputMode); }
        if one_shot(Key::R)     { actions.push(UiAction::Restart); }
        if one_shot(Key::T)     { actions.push(UiAction::Tap(Tap::Screen)); }
        let toggle_hand = one_shot(Key::H);

        // ── Mouse → hand position, clicks → taps ──────────────────────────
        let mut hand = self.hand;
        if toggle_hand { hand.present = !hand.present; }
        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            hand.x = (mx / STAGE_W as f32).clamp(0.0, 1.0);
            hand.y = (my / STATUS_Y as f32).clamp(0.0, 1.0);

            let down = self.window.get_mouse_down(MouseButton::Left);
            if down && !self.mouse_down {
                let (px, py) = (mx.max(0.0) as usize, my.max(0.0) as usize);
                let tap = self.slot_rects.iter()
                    .find(|(_, r)| r.contains(px, py))
                    .map_or(Tap::Screen, |&(slot, _)| Tap::Slot(slot));
                actions.push(UiAction::Tap(tap));
            }
            self.mouse_down = down;
        }

        // ── Keys → hand shape ─────────────────────────────────────────────
        hand.extended = if self.window.is_key_down(Key::Space) {
            [false; 5]
        } else if self.window.is_key_down(Key::V) {
            [false, true, true, false, false]
        } else {
            [true; 5]
        };

        if hand != self.hand {
            self.hand = hand;
            let _ = self.sim_tx.send(hand);
        }
        actions
    }

    /// Render one frame.
    pub fn render(&mut self, snap: &FrameSnapshot, question: &str, status: &str) {
        self.frame += 1;
        self.buf.fill(BG_COLOR);
        self.slot_rects.clear();

        // ── Stage ─────────────────────────────────────────────────────────
        match snap.phase {
            Phase::Intro | Phase::CategoryChosen => self.draw_categories(snap.category),
            Phase::QuestionInput | Phase::Focusing => self.draw_question(question, snap.phase),
            Phase::Shuffling | Phase::Transitioning => self.draw_shuffling(snap.energy),
            Phase::DeckReady | Phase::AutoSpreading | Phase::PickingGuide | Phase::Picking => {
                self.draw_orbit(&snap.cards, snap.spread_progress);
                self.draw_spread(&snap.spread);
            }
            Phase::Manifesting | Phase::Revealed => self.draw_spread(&snap.spread),
        }
        if snap.input_mode == InputMode::Gesture && snap.phase >= Phase::DeckReady {
            self.draw_pointer(snap.pointer.0, snap.pose);
        }

        // ── Panel ─────────────────────────────────────────────────────────
        self.draw_panel(snap);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, STAGE_W, WIN_H - STATUS_Y, TEXT_BG);
        self.draw_text(status, 10, STATUS_Y + 8, 1, TEXT_COLOR);
        self.draw_text(
            "1-3=category  Enter=ask  mouse=hand  Space=fist  V=two fingers  H=hand on/off  click/T=tap  M=mode  R=restart  Q=quit",
            10, WIN_H - 14, 1, DIM_TEXT,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Stage views ───────────────────────────────────────────────────────

    fn draw_categories(&mut self, chosen: Option<Category>) {
        self.draw_text("CHOOSE YOUR READING", 60, 60, 3, GOLD);
        for (i, cat) in Category::ALL.iter().enumerate() {
            let y = 140 + i * 110;
            let selected = chosen == Some(*cat);
            let bg = if selected { blend(PANEL_BG, GOLD, 0.25) } else { PANEL_BG };
            self.fill_rect(60, y, STAGE_W - 120, 90, bg);
            self.draw_border(60, y, STAGE_W - 120, 90, if selected { GOLD } else { CARD_BACK });
            self.draw_text(&format!("{}  {}", i + 1, cat.label()), 80, y + 16, 3, TEXT_COLOR);
            self.draw_text(cat.description(), 80, y + 50, 2, DIM_TEXT);
            self.draw_text(cat.spread().name(), 80, y + 70, 1, DIM_TEXT);
        }
    }

    fn draw_question(&mut self, question: &str, phase: Phase) {
        self.draw_text("YOUR QUESTION", 60, 80, 3, GOLD);
        let text = if question.is_empty() { "(no question, the cards will speak freely)" } else { question };
        for (i, line) in wrap_text(text, 48).iter().enumerate() {
            self.draw_text(line, 60, 140 + i * 20, 2, TEXT_COLOR);
        }
        if phase == Phase::QuestionInput {
            self.draw_text("PRESS ENTER TO BEGIN", 60, STATUS_Y - 80, 2, DIM_TEXT);
        }
    }

    /// A square deck that shakes harder as energy builds.
    fn draw_shuffling(&mut self, energy: f32) {
        let frac = energy_fraction(energy);
        let amp  = 2.0 + frac * 14.0;
        for layer in 0..6 {
            let phase = self.frame as f32 * 0.35 + layer as f32 * 1.7;
            let dx = (phase.sin() * amp) as isize;
            let dy = ((phase * 1.3).cos() * amp * 0.5) as isize;
            let x  = (STAGE_CX as isize - 60 + dx + layer as isize * 2).max(0) as usize;
            let y  = (STAGE_CY as isize - 90 + dy - layer as isize * 2).max(0) as usize;
            self.draw_card_back(x, y, 120, 180, blend(CARD_BACK, GOLD, frac * 0.4));
        }
        let bar_x = STAGE_CX as usize - 200;
        self.draw_bar(bar_x, STATUS_Y - 70, 400, 16, frac, ENERGY_COLOR);
    }

    /// Top-down view of the orbit; the viewer sits at the bottom of the stage.
    fn draw_orbit(&mut self, cards: &[CardTransform], spread_progress: f32) {
        let open = (spread_progress / 100.0).clamp(0.0, 1.0);
        let mut order: Vec<&CardTransform> = cards.iter().collect();
        order.sort_by(|a, b| a.position[2].total_cmp(&b.position[2]));

        for card in order {
            let (sx, sy) = orbit_to_screen(card.position[0] * open, card.position[2] * open);
            let w = (14.0 * card.scale).max(3.0) as usize;
            let h = (20.0 * card.scale).max(4.0) as usize;
            let depth = ((card.position[1] + 4.0) / 8.0).clamp(0.0, 1.0);
            let color = if card.highlighted { GOLD } else { blend(CARD_BACK, 0xFFFFFFFF, depth * 0.3) };
            let x = (sx - w as f32 / 2.0).max(0.0) as usize;
            let y = (sy - h as f32 / 2.0).max(0.0) as usize;
            self.fill_rect(x, y, w, h, color);
            self.draw_border(x, y, w, h, blend(color, 0xFF000000, 0.4));
        }

        let (vx, vy) = orbit_to_screen(0.0, 3.0);
        self.draw_diamond(vx as usize, vy as usize, 4, DIM_TEXT);
    }

    fn draw_spread(&mut self, spread: &[SpreadSlotView]) {
        for view in spread {
            let r = slot_rect(view.position);
            self.slot_rects.push((view.slot, r));
            if view.revealed {
                self.draw_card_face(r, view);
            } else {
                self.draw_card_back(r.x, r.y, r.w, r.h, CARD_BACK);
                self.draw_text(view.label, r.x + 4, r.y + r.h + 4, 1, DIM_TEXT);
            }
        }
    }

    fn draw_card_back(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        self.fill_rect(x, y, w, h, color);
        self.draw_border(x, y, w, h, GOLD);
        if w > 12 && h > 12 {
            self.draw_border(x + 5, y + 5, w - 10, h - 10, blend(color, GOLD, 0.5));
        }
        self.draw_diamond(x + w / 2, y + h / 2, (w.min(h) / 6).max(1), GOLD);
    }

    fn draw_card_face(&mut self, r: Rect, view: &SpreadSlotView) {
        self.fill_rect(r.x, r.y, r.w, r.h, CARD_FACE);
        self.draw_border(r.x, r.y, r.w, r.h, GOLD);
        self.draw_text(view.label, r.x + 4, r.y + 4, 1, 0xFF7A5C2E);
        for (i, line) in wrap_text(&view.name, (r.w - 8) / 4).iter().enumerate() {
            self.draw_text(line, r.x + 4, r.y + 30 + i * 8, 1, 0xFF222222);
        }
        if view.orientation.is_reversed() {
            self.draw_text("REVERSED", r.x + 4, r.y + r.h - 10, 1, 0xFFAA3344);
        }
    }

    fn draw_pointer(&mut self, pointer_x: f32, pose: Pose) {
        let x = (STAGE_CX + pointer_x * STAGE_W as f32).clamp(0.0, (STAGE_W - 1) as f32) as usize;
        let color = match pose {
            Pose::Hovering => ENERGY_COLOR,
            Pose::Grabbing => GRAB_COLOR,
            Pose::None     => DIM_TEXT,
        };
        self.draw_diamond(x, STATUS_Y - 16, 6, color);
    }

    // ── Panel ─────────────────────────────────────────────────────────────

    fn draw_panel(&mut self, snap: &FrameSnapshot) {
        let x = STAGE_W + 20;
        self.fill_rect(STAGE_W, 0, PANEL_W, WIN_H, PANEL_BG);
        self.draw_text("GESTURE DECK", x, 16, 2, GOLD);
        self.draw_text(snap.phase.name(), x, 44, 2, TEXT_COLOR);

        let mut y = 70;
        for line in wrap_text(snap.phase.hint(snap.input_mode), BAR_W / 4) {
            self.draw_text(&line, x, y, 1, DIM_TEXT);
            y += 8;
        }

        y += 10;
        let mode = match snap.input_mode { InputMode::Gesture => "GESTURE", InputMode::Touch => "TOUCH" };
        let pose = match snap.pose { Pose::None => "-", Pose::Hovering => "OPEN", Pose::Grabbing => "FIST" };
        self.draw_text(&format!("MODE: {}   POSE: {}", mode, pose), x, y, 1, TEXT_COLOR);
        y += 12;
        if let Some(cat) = snap.category {
            let target = cat.spread().count();
            self.draw_text(
                &format!("{}: {}  {}/{}", cat.label(), cat.spread().name(), snap.spread.len(), target),
                x, y, 1, TEXT_COLOR,
            );
        }
        y += 20;

        self.draw_text("ENERGY", x, y, 1, DIM_TEXT);
        self.draw_bar(x, y + 8, BAR_W, BAR_H, energy_fraction(snap.energy), ENERGY_COLOR);
        y += 28;
        self.draw_text("GRAB", x, y, 1, DIM_TEXT);
        let grab_color = if snap.cooldown { COOLDOWN_COLOR } else { GRAB_COLOR };
        self.draw_bar(x, y + 8, BAR_W, BAR_H, snap.grab_progress / 100.0, grab_color);
        y += 36;

        // ── Passages ──────────────────────────────────────────────────────
        for view in snap.spread.iter().filter(|v| v.revealed) {
            if y + 20 > WIN_H { break; }
            self.draw_text(&format!("{}: {}", view.label, view.name), x, y, 1, GOLD);
            y += 10;
            if let Some(p) = &view.passage {
                for line in wrap_text(p, BAR_W / 4) {
                    if y + 8 > WIN_H { break; }
                    self.draw_text(&line, x, y, 1, TEXT_COLOR);
                    y += 8;
                }
            }
            y += 8;
        }
    }

    fn draw_bar(&mut self, x: usize, y: usize, w: usize, h: usize, frac: f32, color: u32) {
        self.fill_rect(x, y, w, h, TEXT_BG);
        let filled = (w as f32 * frac.clamp(0.0, 1.0)) as usize;
        self.fill_rect(x, y, filled, h, color);
        self.draw_border(x, y, w, h, DIM_TEXT);
    }

    // ── Primitives ────────────────────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y+h).min(WIN_H) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn draw_diamond(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        for dy in 0..=r as isize {
            let half = r as isize - dy;
            for dx in -half..=half {
                for sy in [cy as isize + dy, cy as isize - dy] {
                    let sx = cx as isize + dx;
                    if sx >= 0 && sy >= 0 {
                        self.set_pixel(sx as usize, sy as usize, color);
                    }
                }
            }
        }
    }

    /// 3×5 bitmap text, each glyph pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + 4 * scale > WIN_W { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Projection helpers
// ════════════════════════════════════════════════════════════════════════════

/// World (x, z) on the orbit plane to stage pixels.
fn orbit_to_screen(x: f32, z: f32) -> (f32, f32) {
    (STAGE_CX + x * ORBIT_PX, STAGE_CY + z * ORBIT_PX)
}

/// Screen rectangle of a spread slot, centred on its (x, y) world position.
fn slot_rect(position: [f32; 3]) -> Rect {
    let cx = STAGE_CX + position[0] * SPREAD_PX;
    let cy = STAGE_CY - position[1] * SPREAD_PX;
    Rect {
        x: (cx - SLOT_W as f32 / 2.0).max(0.0) as usize,
        y: (cy - SLOT_H as f32 / 2.0).max(0.0) as usize,
        w: SLOT_W,
        h: SLOT_H,
    }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line  = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() { lines.push(std::mem::take(&mut line)); }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if line.is_empty() { word.len() } else { line.chars().count() + 1 + word.len() };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() { line.push(' '); }
        line.extend(word);
    }
    if !line.is_empty() { lines.push(line); }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '?' => [0b111, 0b001, 0b010, 0b000, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}
