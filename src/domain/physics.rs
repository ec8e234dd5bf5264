/// Body physics: single source of truth for motion and landing.
///
/// ## Architecture
///
/// Two layers:
///   1. GEOMETRY: axis-aligned rectangles and the overlap test.
///   2. BODIES:   position + size + velocity, integrated once per tick
///                 and resolved against the platform list.
///
/// ## Landing rules
///
/// A body LANDS on a platform during a step if ALL of:
///   - its horizontal extent strictly overlaps the platform
///   - its bottom edge is at/below the platform top after moving
///   - its bottom edge was at/above the platform top before this step's `vy`
///
/// Landing snaps the bottom to the platform top, zeroes `vy` and sets
/// `on_ground`. Every platform is checked (no early exit) so a body resting
/// on the seam between two adjacent platforms stays put.
///
/// There are no ceilings and no side walls: horizontal limits (room bounds,
/// the closed door) are clamped per entity by the step.

/// Downward acceleration applied to every gravity-bound body, px/tick².
pub const GRAVITY: f32 = 0.72;

// ══════════════════════════════════════════════════════════════
// Layer 1: Geometry
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Grow the rectangle horizontally by `dx` on each side.
    pub fn inflate_x(&self, dx: f32) -> Rect {
        Rect { x: self.x - dx, y: self.y, w: self.w + dx * 2.0, h: self.h }
    }
}

/// Half-open AABB overlap. Touching edges do NOT overlap.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

// ══════════════════════════════════════════════════════════════
// Layer 2: Bodies
// ══════════════════════════════════════════════════════════════

/// Common motion state of player, monsters, elite, boss and projectiles.
#[derive(Clone, Copy, Debug, Default)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Body { x, y, w, h, vx: 0.0, vy: 0.0, on_ground: false }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Clamp the left edge so the whole body stays within `[left, right]`.
    pub fn clamp_x(&mut self, left: f32, right: f32) {
        self.x = self.x.max(left).min(right - self.w);
    }
}

/// Apply gravity and move by the current velocity.
#[inline]
pub fn integrate(body: &mut Body) {
    body.vy += GRAVITY;
    body.x += body.vx;
    body.y += body.vy;
}

/// Resolve downward landings against every platform.
pub fn resolve_against_platforms(body: &mut Body, platforms: &[Rect]) {
    body.on_ground = false;
    for p in platforms {
        let horizontal = body.x + body.w > p.x && body.x < p.x + p.w;
        if !horizontal { continue; }

        let bottom = body.y + body.h;
        let prev_bottom = bottom - body.vy;
        if bottom >= p.y && prev_bottom <= p.y {
            body.y = p.y - body.h;
            body.vy = 0.0;
            body.on_ground = true;
        }
    }
}
