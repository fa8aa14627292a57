//! Capture session state machine.
//!
//! A session begins idle over a frozen screenshot, turns pointer drags into a
//! selection rectangle, and once the selection is locked routes further input
//! to the resize handles and the active annotation tool. The embedding shell
//! feeds raw pointer and key events in and listens for a [`SessionSignal`]
//! carrying the composited capture or a cancellation.

use crate::capture::ScreenCapture;
use crate::composite::{self, PLACEHOLDER_COLOR};
use crate::context::ToolContext;
use crate::geometry::{Point, Rect};
use crate::model::{Color, Style, StylePalette, Thickness, ToolKind};
use crate::pixelate::PixelSource;
use crate::tools::{self, AnnotationTool, TextEdit};
use image::RgbaImage;

/// A selection drag must exceed this in both dimensions to lock.
pub const MIN_LOCK_SIZE: f32 = 5.0;

/// Floor for either selection dimension while a resize handle is dragged.
pub const MIN_RESIZE_SIZE: f32 = 1.0;

/// Pointer distance within which a resize handle grabs.
pub const HANDLE_HIT_RADIUS: f32 = 6.0;

/// Gap between the locked selection and its anchored chrome panels.
pub const PANEL_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No drag started yet.
    Idle,
    /// Primary button held, selection rectangle following the pointer.
    Selecting,
    /// Selection locked; tools and resize handles are live.
    Locked,
}

/// Sub-state of a locked selection, for callers that render tool feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPhase {
    NoTool,
    ToolIdle(ToolKind),
    ToolDrawing(ToolKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Keys the session reacts to. Printable input arrives as `Char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Char(char),
}

/// Terminal outcome of a session.
#[derive(Debug)]
pub enum SessionSignal {
    /// Final composited image, cropped to the selection.
    Completed(RgbaImage),
    Cancelled,
}

/// Pointer shape the shell should show, derived from what sits under the
/// cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorIcon {
    Crosshair,
    ResizeNwse,
    ResizeNesw,
    ResizeNs,
    ResizeEw,
}

/// The eight resize handles of a locked selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Left,
        Handle::Right,
        Handle::BottomLeft,
        Handle::Bottom,
        Handle::BottomRight,
    ];

    /// Where this handle sits on the selection border.
    pub fn anchor(self, rect: Rect) -> Point {
        let cx = rect.center().x;
        let cy = rect.center().y;
        match self {
            Handle::TopLeft => Point::new(rect.x, rect.y),
            Handle::Top => Point::new(cx, rect.y),
            Handle::TopRight => Point::new(rect.right(), rect.y),
            Handle::Left => Point::new(rect.x, cy),
            Handle::Right => Point::new(rect.right(), cy),
            Handle::BottomLeft => Point::new(rect.x, rect.bottom()),
            Handle::Bottom => Point::new(cx, rect.bottom()),
            Handle::BottomRight => Point::new(rect.right(), rect.bottom()),
        }
    }

    fn moves_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Left | Handle::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, Handle::TopRight | Handle::Right | Handle::BottomRight)
    }

    fn moves_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::Top | Handle::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(
            self,
            Handle::BottomLeft | Handle::Bottom | Handle::BottomRight
        )
    }

    fn flip_horizontal(self) -> Handle {
        match self {
            Handle::TopLeft => Handle::TopRight,
            Handle::TopRight => Handle::TopLeft,
            Handle::Left => Handle::Right,
            Handle::Right => Handle::Left,
            Handle::BottomLeft => Handle::BottomRight,
            Handle::BottomRight => Handle::BottomLeft,
            other => other,
        }
    }

    fn flip_vertical(self) -> Handle {
        match self {
            Handle::TopLeft => Handle::BottomLeft,
            Handle::BottomLeft => Handle::TopLeft,
            Handle::Top => Handle::Bottom,
            Handle::Bottom => Handle::Top,
            Handle::TopRight => Handle::BottomRight,
            Handle::BottomRight => Handle::TopRight,
            other => other,
        }
    }

    /// Cursor shown while hovering or dragging this handle. Flips track the
    /// handle's current role, so dragging an edge past its opposite updates
    /// the icon.
    pub fn cursor(self) -> CursorIcon {
        match self {
            Handle::TopLeft | Handle::BottomRight => CursorIcon::ResizeNwse,
            Handle::TopRight | Handle::BottomLeft => CursorIcon::ResizeNesw,
            Handle::Top | Handle::Bottom => CursorIcon::ResizeNs,
            Handle::Left | Handle::Right => CursorIcon::ResizeEw,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ResizeDrag {
    handle: Handle,
    /// Handle anchor minus pointer position, captured at grab time. Applying
    /// it to the live pointer gives the absolute spot the dragged edge should
    /// land on, so fast pointers never outrun the selection.
    grab_offset: (f32, f32),
}

pub struct CaptureSession {
    viewport: Rect,
    scale: f32,
    background: Option<RgbaImage>,
    phase: Phase,
    drag_origin: Option<Point>,
    selection: Option<Rect>,
    resize: Option<ResizeDrag>,
    tool: Option<Box<dyn AnnotationTool>>,
    context: Option<ToolContext>,
    palette: StylePalette,
    toolbar_visible: bool,
    style_panel_open: bool,
}

impl CaptureSession {
    /// Starts a session over whatever `capture` grabs for its full virtual
    /// bounds. A failed grab degrades to the placeholder background rather
    /// than aborting, so annotation still works when capture is unavailable.
    pub fn begin<C: ScreenCapture>(capture: &mut C, scale: f32) -> Self {
        let bounds = capture.virtual_bounds();
        let background = match capture.capture_region(bounds) {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::warn!(error = %err, "screen capture failed, using placeholder");
                None
            }
        };
        Self::with_background(bounds, scale, background)
    }

    /// Starts a session over an already-captured frame (or none, which uses
    /// the placeholder fill). `viewport` is the logical extent of the frame;
    /// its origin is normalized to (0,0).
    pub fn with_background(viewport: Rect, scale: f32, background: Option<RgbaImage>) -> Self {
        let viewport = Rect::new(0.0, 0.0, viewport.width, viewport.height);
        tracing::debug!(?viewport, scale, has_background = background.is_some(), "session started");
        Self {
            viewport,
            scale,
            background,
            phase: Phase::Idle,
            drag_origin: None,
            selection: None,
            resize: None,
            tool: None,
            context: None,
            palette: StylePalette::default(),
            toolbar_visible: false,
            style_panel_open: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.tool.as_ref().map(|tool| tool.kind())
    }

    pub fn tool_phase(&self) -> ToolPhase {
        match self.tool.as_ref() {
            None => ToolPhase::NoTool,
            Some(tool) if tool.is_drawing() => ToolPhase::ToolDrawing(tool.kind()),
            Some(tool) => ToolPhase::ToolIdle(tool.kind()),
        }
    }

    pub fn toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    pub fn style_panel_open(&self) -> bool {
        self.style_panel_open
    }

    /// Tool state shared with the renderer: layers, pixel source, counters.
    pub fn context(&self) -> Option<&ToolContext> {
        self.context.as_ref()
    }

    pub fn undo_len(&self) -> usize {
        self.context.as_ref().map_or(0, ToolContext::undo_len)
    }

    pub fn redo_len(&self) -> usize {
        self.context.as_ref().map_or(0, ToolContext::redo_len)
    }

    // --- pointer input -----------------------------------------------------

    pub fn pointer_pressed(&mut self, button: PointerButton, pos: Point) -> Option<SessionSignal> {
        match button {
            PointerButton::Secondary => self.cancel_step(),
            PointerButton::Primary => {
                self.primary_pressed(pos);
                None
            }
        }
    }

    pub fn pointer_moved(&mut self, pos: Point) {
        match self.phase {
            Phase::Idle => {}
            Phase::Selecting => {
                if let Some(origin) = self.drag_origin {
                    let clamped = self.viewport.clamp_point(pos);
                    self.selection = Some(Rect::from_corners(origin, clamped));
                }
            }
            Phase::Locked => {
                if self.resize.is_some() {
                    self.apply_resize(pos);
                } else {
                    self.forward_tool_move(pos);
                }
            }
        }
    }

    pub fn pointer_released(&mut self, button: PointerButton, pos: Point) -> Option<SessionSignal> {
        if button != PointerButton::Primary {
            return None;
        }
        match self.phase {
            Phase::Idle => None,
            Phase::Selecting => self.finish_selection(pos),
            Phase::Locked => {
                if self.resize.is_some() {
                    self.finish_resize();
                } else if let (Some(tool), Some(ctx)) = (self.tool.as_mut(), self.context.as_mut())
                {
                    let clamped = ctx.clamp_to_bounds(pos);
                    tool.on_mouse_up(ctx, clamped);
                }
                None
            }
        }
    }

    fn primary_pressed(&mut self, pos: Point) {
        match self.phase {
            Phase::Idle => {
                let clamped = self.viewport.clamp_point(pos);
                self.drag_origin = Some(clamped);
                self.selection = Some(Rect::new(clamped.x, clamped.y, 0.0, 0.0));
                self.phase = Phase::Selecting;
                tracing::debug!(x = clamped.x, y = clamped.y, "selection drag started");
            }
            Phase::Selecting => {
                // Stray extra press mid-drag; treat as a move.
                self.pointer_moved(pos);
            }
            Phase::Locked => {
                if let Some(handle) = self.handle_at(pos) {
                    self.begin_resize(handle, pos);
                } else if let (Some(tool), Some(ctx)) =
                    (self.tool.as_mut(), self.context.as_mut())
                {
                    let clamped = ctx.clamp_to_bounds(pos);
                    tool.on_mouse_down(ctx, clamped);
                }
            }
        }
    }

    fn forward_tool_move(&mut self, pos: Point) {
        if let (Some(tool), Some(ctx)) = (self.tool.as_mut(), self.context.as_mut()) {
            let clamped = ctx.clamp_to_bounds(pos);
            tool.on_mouse_move(ctx, clamped);
        }
    }

    fn finish_selection(&mut self, pos: Point) -> Option<SessionSignal> {
        let origin = self.drag_origin.take()?;
        let clamped = self.viewport.clamp_point(pos);
        let rect = Rect::from_corners(origin, clamped);
        if rect.width > MIN_LOCK_SIZE && rect.height > MIN_LOCK_SIZE {
            self.lock(rect);
            None
        } else {
            // Too small to be a deliberate selection; the whole session ends.
            tracing::debug!(width = rect.width, height = rect.height, "selection below minimum");
            Some(self.cancel_session())
        }
    }

    fn lock(&mut self, rect: Rect) {
        let source = match self.background.as_ref() {
            Some(frame) => PixelSource::render(frame, self.scale),
            None => {
                let phys = self.viewport.scaled(self.scale);
                let placeholder = RgbaImage::from_pixel(
                    (phys.width.round() as u32).max(1),
                    (phys.height.round() as u32).max(1),
                    PLACEHOLDER_COLOR,
                );
                PixelSource::render(&placeholder, self.scale)
            }
        };
        self.context = Some(ToolContext::new(rect, Style::default(), source));
        self.selection = Some(rect);
        self.phase = Phase::Locked;
        self.toolbar_visible = true;
        self.style_panel_open = false;
        tracing::debug!(?rect, "selection locked");
    }

    // --- resize handles ----------------------------------------------------

    /// The handle under `pos`, if any. Handles only exist on a locked
    /// selection.
    pub fn handle_at(&self, pos: Point) -> Option<Handle> {
        if self.phase != Phase::Locked {
            return None;
        }
        let rect = self.selection?;
        let mut best: Option<(Handle, f32)> = None;
        for handle in Handle::ALL {
            let anchor = handle.anchor(rect);
            let dx = anchor.x - pos.x;
            let dy = anchor.y - pos.y;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= HANDLE_HIT_RADIUS * HANDLE_HIT_RADIUS
                && best.map_or(true, |(_, d)| dist_sq < d)
            {
                best = Some((handle, dist_sq));
            }
        }
        best.map(|(handle, _)| handle)
    }

    /// Pointer shape for `pos`: a resize cursor over (or while dragging) a
    /// handle, crosshair otherwise.
    pub fn cursor_at(&self, pos: Point) -> CursorIcon {
        if let Some(drag) = self.resize {
            return drag.handle.cursor();
        }
        match self.handle_at(pos) {
            Some(handle) => handle.cursor(),
            None => CursorIcon::Crosshair,
        }
    }

    fn begin_resize(&mut self, handle: Handle, pos: Point) {
        let Some(rect) = self.selection else { return };
        let anchor = handle.anchor(rect);
        self.resize = Some(ResizeDrag {
            handle,
            grab_offset: (anchor.x - pos.x, anchor.y - pos.y),
        });
        self.style_panel_open = false;
        tracing::debug!(?handle, "resize started");
    }

    fn apply_resize(&mut self, pos: Point) {
        let Some(drag) = self.resize else { return };
        let Some(rect) = self.selection else { return };
        let target = self.viewport.clamp_point(Point::new(
            pos.x + drag.grab_offset.0,
            pos.y + drag.grab_offset.1,
        ));

        let mut left = rect.x;
        let mut right = rect.right();
        let mut top = rect.y;
        let mut bottom = rect.bottom();
        let mut handle = drag.handle;

        if handle.moves_left() {
            left = target.x;
        } else if handle.moves_right() {
            right = target.x;
        }
        if handle.moves_top() {
            top = target.y;
        } else if handle.moves_bottom() {
            bottom = target.y;
        }

        // Crossing the opposite edge flips the rectangle and the handle's
        // role; the grab offset keeps tracking the dragged corner.
        if left > right {
            std::mem::swap(&mut left, &mut right);
            handle = handle.flip_horizontal();
        }
        if top > bottom {
            std::mem::swap(&mut top, &mut bottom);
            handle = handle.flip_vertical();
        }

        // The floor pulls the moving edge back, never the stationary one.
        if right - left < MIN_RESIZE_SIZE {
            if handle.moves_left() {
                left = right - MIN_RESIZE_SIZE;
            } else if handle.moves_right() {
                right = left + MIN_RESIZE_SIZE;
            }
        }
        if bottom - top < MIN_RESIZE_SIZE {
            if handle.moves_top() {
                top = bottom - MIN_RESIZE_SIZE;
            } else if handle.moves_bottom() {
                bottom = top + MIN_RESIZE_SIZE;
            }
        }

        let resized = Rect::new(left, top, right - left, bottom - top);
        self.selection = Some(resized);
        self.resize = Some(ResizeDrag { handle, ..drag });
        if let Some(ctx) = self.context.as_mut() {
            ctx.set_bounds(resized);
        }
    }

    fn finish_resize(&mut self) {
        self.resize = None;
        // Same chrome pass as the initial lock: toolbar back, style panel
        // back if the active tool has one.
        self.toolbar_visible = true;
        self.style_panel_open = self
            .active_tool()
            .map_or(false, |kind| kind.is_styled());
        tracing::debug!(selection = ?self.selection, "resize complete");
    }

    // --- tools and style ---------------------------------------------------

    /// Activates `kind`, or deselects the current tool when `None`. The
    /// outgoing tool gets its sign-off first, so pending text commits.
    pub fn select_tool(&mut self, kind: Option<ToolKind>) {
        if self.phase != Phase::Locked {
            return;
        }
        if let (Some(mut tool), Some(ctx)) = (self.tool.take(), self.context.as_mut()) {
            tool.on_deselected(ctx);
        }
        self.style_panel_open = false;
        let Some(kind) = kind else {
            tracing::debug!("tool deselected");
            return;
        };
        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        if let Some(style) = self.palette.style_for(kind) {
            ctx.update_style(style);
        }
        let mut tool = tools::create(kind);
        tool.on_selected(ctx);
        self.tool = Some(tool);
        self.style_panel_open = kind.is_styled();
        tracing::debug!(?kind, "tool selected");
    }

    /// Adjusts the style of the active tool and remembers it per tool kind
    /// for the rest of the session. Ignored for tools without styles.
    pub fn set_style(&mut self, color: Color, thickness: Thickness) {
        let Some(kind) = self.active_tool() else { return };
        if !kind.is_styled() {
            return;
        }
        let style = Style { color, thickness };
        self.palette.set_style_for(kind, style);
        if let Some(ctx) = self.context.as_mut() {
            ctx.update_style(style);
        }
    }

    /// Current style of the active tool, if it has one.
    pub fn active_style(&self) -> Option<Style> {
        let kind = self.active_tool()?;
        self.palette.style_for(kind)
    }

    pub fn undo(&mut self) -> bool {
        self.context.as_mut().map_or(false, ToolContext::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.context.as_mut().map_or(false, ToolContext::redo)
    }

    // --- keys and cancellation ---------------------------------------------

    pub fn key_pressed(&mut self, key: Key) -> Option<SessionSignal> {
        match key {
            // Escape ends the session from any state, open editors included.
            Key::Escape => Some(self.cancel_session()),
            Key::Enter => {
                self.forward_text_edit(TextEdit::Commit);
                None
            }
            Key::Backspace => {
                self.forward_text_edit(TextEdit::Backspace);
                None
            }
            Key::Char(ch) => {
                self.forward_text_edit(TextEdit::Insert(ch));
                None
            }
        }
    }

    fn forward_text_edit(&mut self, edit: TextEdit) {
        if let (Some(tool), Some(ctx)) = (self.tool.as_mut(), self.context.as_mut()) {
            tool.on_text_edit(ctx, edit);
        }
    }

    /// One step of the secondary-button cancel ladder: stroke, then tool,
    /// then lock, then drag, and only then the session itself.
    fn cancel_step(&mut self) -> Option<SessionSignal> {
        if let (Some(tool), Some(ctx)) = (self.tool.as_mut(), self.context.as_mut()) {
            if tool.is_drawing() {
                tool.cancel(ctx);
                tracing::debug!("stroke cancelled");
                return None;
            }
        }
        if self.tool.is_some() {
            self.select_tool(None);
            return None;
        }
        if self.phase == Phase::Locked {
            self.unlock();
            return None;
        }
        if self.phase == Phase::Selecting || self.drag_origin.is_some() {
            self.reset_to_idle();
            tracing::debug!("selection drag reset");
            return None;
        }
        Some(self.cancel_session())
    }

    /// Drops the lock and all annotations, returning to the pre-selection
    /// idle state over the same background.
    fn unlock(&mut self) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.layers.clear();
        }
        self.context = None;
        self.reset_to_idle();
        tracing::debug!("selection unlocked");
    }

    fn reset_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.drag_origin = None;
        self.selection = None;
        self.resize = None;
        self.tool = None;
        self.toolbar_visible = false;
        self.style_panel_open = false;
    }

    fn cancel_session(&mut self) -> SessionSignal {
        self.teardown();
        tracing::debug!("session cancelled");
        SessionSignal::Cancelled
    }

    fn teardown(&mut self) {
        self.context = None;
        self.reset_to_idle();
    }

    // --- completion --------------------------------------------------------

    /// Composites the locked selection with its annotation layers and ends
    /// the session. `None` unless a selection is locked.
    pub fn save(&mut self) -> Option<SessionSignal> {
        if self.phase != Phase::Locked {
            return None;
        }
        // The toolbar's save press steals focus, which commits open text.
        self.forward_text_edit(TextEdit::Commit);
        self.toolbar_visible = false;
        self.style_panel_open = false;
        let selection = self.selection?;
        let ctx = self.context.as_ref()?;
        let image = composite::compose(
            self.background.as_ref(),
            &ctx.layers,
            ctx.pixel_source(),
            selection,
            self.scale,
        );
        tracing::info!(
            width = image.width(),
            height = image.height(),
            "capture composited"
        );
        self.teardown();
        Some(SessionSignal::Completed(image))
    }

    // --- chrome geometry ---------------------------------------------------

    /// Top-left for a panel of `width` x `height` anchored to the selection:
    /// centered below it, clamped to the viewport, flipped above when there
    /// is no room underneath.
    pub fn panel_anchor(&self, width: f32, height: f32) -> Option<Point> {
        let rect = self.selection?;
        let mut x = rect.x + (rect.width - width) / 2.0;
        x = x.max(0.0).min(self.viewport.width - width);
        let mut y = rect.bottom() + PANEL_MARGIN;
        if y + height > self.viewport.height {
            y = rect.y - height - PANEL_MARGIN;
        }
        Some(Point::new(x, y.max(0.0)))
    }

    /// Live dimension readout for the selection, in whole logical units.
    pub fn size_label(&self) -> Option<String> {
        let rect = self.selection?;
        Some(format!("{} × {}", rect.width as i32, rect.height as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_session() -> CaptureSession {
        let mut session = CaptureSession::with_background(
            Rect::new(0.0, 0.0, 400.0, 300.0),
            1.0,
            Some(RgbaImage::from_pixel(400, 300, image::Rgba([9, 9, 9, 255]))),
        );
        session.pointer_pressed(PointerButton::Primary, Point::new(100.0, 100.0));
        session.pointer_moved(Point::new(300.0, 250.0));
        session.pointer_released(PointerButton::Primary, Point::new(300.0, 250.0));
        assert_eq!(session.phase(), Phase::Locked);
        session
    }

    #[test]
    fn drag_below_minimum_cancels_session() {
        let mut session = CaptureSession::with_background(
            Rect::new(0.0, 0.0, 400.0, 300.0),
            1.0,
            None,
        );
        session.pointer_pressed(PointerButton::Primary, Point::new(10.0, 10.0));
        session.pointer_moved(Point::new(15.0, 40.0));
        let signal = session.pointer_released(PointerButton::Primary, Point::new(15.0, 40.0));
        // 5 wide is not strictly greater than the minimum.
        assert!(matches!(signal, Some(SessionSignal::Cancelled)));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn lock_shows_toolbar_and_seeds_context() {
        let session = locked_session();
        assert!(session.toolbar_visible());
        assert!(!session.style_panel_open());
        assert_eq!(session.selection(), Some(Rect::new(100.0, 100.0, 200.0, 150.0)));
        assert!(session.context().is_some());
    }

    #[test]
    fn handle_hit_testing_prefers_nearest() {
        let session = locked_session();
        // Selection spans (100,100)..(300,250).
        assert_eq!(
            session.handle_at(Point::new(101.0, 99.0)),
            Some(Handle::TopLeft)
        );
        assert_eq!(
            session.handle_at(Point::new(200.0, 252.0)),
            Some(Handle::Bottom)
        );
        assert_eq!(session.handle_at(Point::new(200.0, 175.0)), None);
    }

    #[test]
    fn corner_drag_past_opposite_edge_flips() {
        let mut session = locked_session();
        session.pointer_pressed(PointerButton::Primary, Point::new(300.0, 250.0));
        session.pointer_moved(Point::new(80.0, 60.0));
        // BottomRight dragged beyond the top-left corner mirrors the rect.
        let rect = session.selection().unwrap();
        assert_eq!(rect, Rect::new(80.0, 60.0, 20.0, 40.0));
        assert_eq!(session.cursor_at(Point::new(0.0, 0.0)), CursorIcon::ResizeNwse);
        session.pointer_released(PointerButton::Primary, Point::new(80.0, 60.0));
        assert_eq!(session.selection().unwrap(), rect);
    }

    #[test]
    fn edge_drag_honors_one_unit_floor() {
        let mut session = locked_session();
        // Grab the right edge and push it exactly onto the left edge.
        session.pointer_pressed(PointerButton::Primary, Point::new(300.0, 175.0));
        session.pointer_moved(Point::new(100.0, 175.0));
        let rect = session.selection().unwrap();
        assert_eq!(rect.width, MIN_RESIZE_SIZE);
        assert_eq!(rect.x, 100.0);
    }

    #[test]
    fn resize_is_clamped_to_viewport() {
        let mut session = locked_session();
        session.pointer_pressed(PointerButton::Primary, Point::new(300.0, 250.0));
        session.pointer_moved(Point::new(900.0, 700.0));
        let rect = session.selection().unwrap();
        assert_eq!(rect.right(), 400.0);
        assert_eq!(rect.bottom(), 300.0);
    }

    #[test]
    fn cancel_ladder_unwinds_one_level_at_a_time() {
        let mut session = locked_session();
        session.select_tool(Some(ToolKind::Rect));
        assert!(session.style_panel_open());

        // Mid-stroke: only the stroke dies.
        session.pointer_pressed(PointerButton::Primary, Point::new(120.0, 120.0));
        session.pointer_moved(Point::new(150.0, 150.0));
        assert_eq!(session.tool_phase(), ToolPhase::ToolDrawing(ToolKind::Rect));
        assert!(session
            .pointer_pressed(PointerButton::Secondary, Point::new(150.0, 150.0))
            .is_none());
        assert_eq!(session.tool_phase(), ToolPhase::ToolIdle(ToolKind::Rect));

        // Tool selected: deselects.
        assert!(session
            .pointer_pressed(PointerButton::Secondary, Point::new(150.0, 150.0))
            .is_none());
        assert_eq!(session.tool_phase(), ToolPhase::NoTool);
        assert_eq!(session.phase(), Phase::Locked);

        // Locked: unlocks and clears.
        assert!(session
            .pointer_pressed(PointerButton::Secondary, Point::new(150.0, 150.0))
            .is_none());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.selection().is_none());

        // Idle with nothing left: the session itself goes.
        let signal = session.pointer_pressed(PointerButton::Secondary, Point::new(0.0, 0.0));
        assert!(matches!(signal, Some(SessionSignal::Cancelled)));
    }

    #[test]
    fn secondary_press_resets_a_selection_drag() {
        let mut session = CaptureSession::with_background(
            Rect::new(0.0, 0.0, 400.0, 300.0),
            1.0,
            None,
        );
        session.pointer_pressed(PointerButton::Primary, Point::new(50.0, 50.0));
        session.pointer_moved(Point::new(180.0, 140.0));
        assert_eq!(session.phase(), Phase::Selecting);

        // The drag dies quietly; the overlay stays up for another attempt.
        assert!(session
            .pointer_pressed(PointerButton::Secondary, Point::new(180.0, 140.0))
            .is_none());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.selection().is_none());

        // With nothing left to unwind, the next press ends the session.
        let signal = session.pointer_pressed(PointerButton::Secondary, Point::new(180.0, 140.0));
        assert!(matches!(signal, Some(SessionSignal::Cancelled)));
    }

    #[test]
    fn escape_cancels_even_while_drawing() {
        let mut session = locked_session();
        session.select_tool(Some(ToolKind::Arrow));
        session.pointer_pressed(PointerButton::Primary, Point::new(120.0, 120.0));
        let signal = session.key_pressed(Key::Escape);
        assert!(matches!(signal, Some(SessionSignal::Cancelled)));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn style_survives_tool_switch() {
        let mut session = locked_session();
        session.select_tool(Some(ToolKind::Rect));
        session.set_style(Color::Red, Thickness::Thick);
        session.select_tool(Some(ToolKind::Arrow));
        assert_eq!(session.active_style(), Some(Style::default()));
        session.select_tool(Some(ToolKind::Rect));
        assert_eq!(
            session.active_style(),
            Some(Style { color: Color::Red, thickness: Thickness::Thick })
        );
    }

    #[test]
    fn panel_anchor_centers_clamps_and_flips() {
        let mut session = locked_session();
        // Selection (100,100)..(300,250): centered below.
        assert_eq!(
            session.panel_anchor(100.0, 30.0),
            Some(Point::new(150.0, 260.0))
        );
        // Selection touching the bottom flips the panel above.
        session.pointer_pressed(PointerButton::Primary, Point::new(300.0, 250.0));
        session.pointer_moved(Point::new(300.0, 300.0));
        session.pointer_released(PointerButton::Primary, Point::new(300.0, 300.0));
        assert_eq!(
            session.panel_anchor(100.0, 30.0),
            Some(Point::new(150.0, 100.0 - 30.0 - PANEL_MARGIN))
        );
    }

    #[test]
    fn size_label_reports_whole_units() {
        let session = locked_session();
        assert_eq!(session.size_label().as_deref(), Some("200 × 150"));
    }
}
