use crate::graphics::{draw_line, draw_triangle, face_normal, fill_rect, shade};
use crate::rotation::{
    self, multiply_matrices, multiply_matrix_vector, rotation_x, rotation_z, CUBE_FACES,
    FACE_EDGES,
};
use crate::sample::Sample;
use crate::session::Session;
use crate::state::AppState;
use crate::vertex::ProjectedVertex;
use crate::window::angle_axis_bounds;
use druid::text::FontFamily;
use druid::widget::prelude::*;
use druid::{
    commands,
    piet::{InterpolationMode, Text, TextLayout, TextLayoutBuilder},
    Color, RenderContext, Widget,
};
use std::time::{Duration, Instant};

/// Fixed viewing direction for the pose panel, matching the usual 3D plot
/// perspective: rotate about the height axis, then tilt down.
const VIEW_AZIMUTH_DEG: f64 = -60.0;
const VIEW_ELEVATION_DEG: f64 = 30.0;

/// World-space half-extent of the pose panel; positions are in g, and the
/// sensor stays well inside [-2, 2] on both axes.
const POSE_RANGE: f64 = 2.0;

const BACKGROUND: Color = Color::rgb8(245, 245, 245);
const PANEL_BORDER: Color = Color::rgb8(130, 130, 140);
const CUBE_COLOR: Color = Color::rgb8(0, 255, 255);
const EDGE_COLOR: Color = Color::rgb8(20, 20, 20);
const TRAJECTORY_COLOR: Color = Color::rgb8(0, 170, 170);
const YAW_COLOR: Color = Color::rgb8(220, 30, 30);
const PITCH_COLOR: Color = Color::rgb8(20, 160, 20);
const ROLL_COLOR: Color = Color::rgb8(30, 30, 220);
const TEXT_COLOR: Color = Color::rgb8(50, 50, 60);

/// Live visualizer widget: polls the telemetry session on a fixed-interval
/// timer and repaints the pose and angle panels when a sample arrives.
pub struct VisualizerWidget {
    session: Session,
    cube_size: f64,
    interval: Duration,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

/// One panel's pixel rectangle.
struct Panel {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

impl Panel {
    fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.w as f64 / 2.0,
            self.y as f64 + self.h as f64 / 2.0,
        )
    }
}

impl VisualizerWidget {
    pub fn new(session: Session, cube_size: f64, interval: Duration) -> Self {
        VisualizerWidget {
            session,
            cube_size,
            interval,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    /// Rotates a world point into view space. World layout is
    /// [x, depth, height]; the screen takes view x rightward, view height
    /// upward, and view depth for the z-test.
    fn view_transform(world: &[f64; 3]) -> [f64; 3] {
        let view = multiply_matrices(
            &rotation_x(VIEW_ELEVATION_DEG.to_radians()),
            &rotation_z(VIEW_AZIMUTH_DEG.to_radians()),
        );
        multiply_matrix_vector(&view, world)
    }

    /// Projects a world point onto a panel with an orthographic camera.
    fn project(world: &[f64; 3], panel: &Panel) -> ProjectedVertex {
        let view = Self::view_transform(world);
        let (cx, cy) = panel.center();
        let scale = (panel.w.min(panel.h)) as f64 / (2.0 * POSE_RANGE);
        ProjectedVertex {
            screen_position: [cx + view[0] * scale, cy - view[2] * scale],
            position: view,
        }
    }

    /// Paints the 3D pose panel: trajectory trace plus the shaded cuboid at
    /// the latest position and orientation.
    fn paint_pose_panel(
        &self,
        panel: &Panel,
        pixel_data: &mut [u8],
        z_buffer: &mut [f64],
        width: usize,
        height: usize,
    ) {
        // Trajectory at constant zero height, oldest to newest.
        let mut previous: Option<ProjectedVertex> = None;
        for (x, z) in self.session.window().trajectory() {
            let point = Self::project(&[x, z, 0.0], panel);
            if let Some(prev) = previous {
                draw_line(
                    prev.screen_position[0],
                    prev.screen_position[1],
                    point.screen_position[0],
                    point.screen_position[1],
                    pixel_data,
                    width,
                    height,
                    TRAJECTORY_COLOR,
                );
            }
            previous = Some(point);
        }

        let Some(sample) = self.session.window().latest() else {
            return;
        };

        // The cuboid is derived data: rebuilt from scratch every paint.
        let placed = rotation::rotate_and_place(
            sample.yaw,
            sample.pitch,
            sample.roll,
            sample.x,
            sample.z,
            self.cube_size,
        );
        let projected: Vec<ProjectedVertex> =
            placed.iter().map(|v| Self::project(v, panel)).collect();

        for quad in &CUBE_FACES {
            let v0 = &projected[quad[0]];
            let v1 = &projected[quad[1]];
            let v2 = &projected[quad[2]];
            let v3 = &projected[quad[3]];

            let normal = face_normal(&v0.position, &v1.position, &v2.position);
            let color = shade(&CUBE_COLOR, &normal);

            draw_triangle(v0, v1, v2, pixel_data, z_buffer, width, height, color.clone());
            draw_triangle(v0, v2, v3, pixel_data, z_buffer, width, height, color);
        }

        // Black face outlines over the fills.
        for quad in &CUBE_FACES {
            for [a, b] in FACE_EDGES {
                let start = &projected[quad[a]];
                let end = &projected[quad[b]];
                draw_line(
                    start.screen_position[0],
                    start.screen_position[1],
                    end.screen_position[0],
                    end.screen_position[1],
                    pixel_data,
                    width,
                    height,
                    EDGE_COLOR,
                );
            }
        }
    }

    /// Paints the 2D angle-versus-frame panel.
    fn paint_angle_panel(
        &self,
        panel: &Panel,
        pixel_data: &mut [u8],
        width: usize,
        height: usize,
    ) {
        let (frames_max, y_lo, y_hi) = angle_axis_bounds(self.session.window());

        let plot = Panel {
            x: panel.x + 44,
            y: panel.y + 28,
            w: panel.w.saturating_sub(60),
            h: panel.h.saturating_sub(56),
        };

        // Axis lines: left and bottom.
        draw_line(
            plot.x as f64,
            plot.y as f64,
            plot.x as f64,
            (plot.y + plot.h) as f64,
            pixel_data,
            width,
            height,
            PANEL_BORDER,
        );
        draw_line(
            plot.x as f64,
            (plot.y + plot.h) as f64,
            (plot.x + plot.w) as f64,
            (plot.y + plot.h) as f64,
            pixel_data,
            width,
            height,
            PANEL_BORDER,
        );

        let to_screen = |frame: f64, angle: f64| -> (f64, f64) {
            let sx = plot.x as f64 + frame / frames_max * plot.w as f64;
            let sy = (plot.y + plot.h) as f64 - (angle - y_lo) / (y_hi - y_lo) * plot.h as f64;
            (sx, sy)
        };

        let window = self.session.window();
        let series: [(Vec<f64>, Color); 3] = [
            (window.yaw().collect(), YAW_COLOR),
            (window.pitch().collect(), PITCH_COLOR),
            (window.roll().collect(), ROLL_COLOR),
        ];
        for (values, color) in &series {
            for (i, pair) in values.windows(2).enumerate() {
                let (x0, sy0) = to_screen(i as f64, pair[0]);
                let (x1, sy1) = to_screen(i as f64 + 1.0, pair[1]);
                draw_line(x0, sy0, x1, sy1, pixel_data, width, height, color.clone());
            }
        }
    }

    fn draw_text(&self, ctx: &mut PaintCtx, text: String, pos: (f64, f64), color: Color) {
        let layout = ctx
            .text()
            .new_text_layout(text)
            .font(FontFamily::SYSTEM_UI, 12.0)
            .text_color(color)
            .build()
            .unwrap();
        ctx.draw_text(&layout, pos);
    }

    fn debug_lines(&self, data: &AppState) -> Vec<String> {
        let mut lines = vec![
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("Port: {}", data.port),
            format!("FPS: {:.2}", self.fps),
            format!(
                "Window: {}/{}",
                self.session.window().len(),
                self.session.window().capacity()
            ),
            format!("Frames: {}", self.session.frame_count()),
        ];
        if let Some(Sample {
            x,
            z,
            yaw,
            pitch,
            roll,
        }) = self.session.window().latest()
        {
            lines.push(format!("Position: ({:.3}, {:.3})", x, z));
            lines.push(format!(
                "Yaw: {:.1}  Pitch: {:.1}  Roll: {:.1}",
                yaw, pitch, roll
            ));
        }
        lines
    }
}

impl Widget<AppState> for VisualizerWidget {
    /// Handle events for the visualizer widget
    fn event(&mut self, ctx: &mut EventCtx, event: &Event, data: &mut AppState, _env: &Env) {
        match event {
            Event::WindowConnected => {
                ctx.request_timer(self.interval);
                // Request focus to receive keyboard events
                ctx.request_focus();
            }
            Event::Timer(_) => {
                // One full poll-parse-append step per tick; a tick with no
                // new sample leaves the previous frame on screen.
                if !data.paused && self.session.poll().is_some() {
                    ctx.request_paint();
                }
                ctx.request_timer(self.interval);
            }
            Event::KeyDown(key_event) => {
                if let druid::keyboard_types::Key::Character(s) = &key_event.key {
                    match s.as_str() {
                        "d" | "D" => {
                            data.debug = !data.debug;
                            ctx.request_paint();
                        }
                        "p" | "P" => {
                            data.paused = !data.paused;
                            ctx.request_paint();
                        }
                        "q" | "Q" => {
                            ctx.submit_command(commands::QUIT_APP);
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn lifecycle(
        &mut self,
        _ctx: &mut LifeCycleCtx,
        _event: &LifeCycle,
        _data: &AppState,
        _env: &Env,
    ) {
    }

    fn update(&mut self, _ctx: &mut UpdateCtx, _old_data: &AppState, _data: &AppState, _env: &Env) {
    }

    /// Determines the layout constraints for the visualizer widget
    fn layout(
        &mut self,
        _layout_ctx: &mut LayoutCtx,
        bc: &BoxConstraints,
        _data: &AppState,
        _env: &Env,
    ) -> Size {
        bc.max()
    }

    /// Paint both panels into a fresh pixel buffer, then overlay text.
    fn paint(&mut self, ctx: &mut PaintCtx, data: &AppState, _env: &Env) {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let size = ctx.size();
        let width = size.width as usize;
        let height = size.height as usize;
        if width == 0 || height == 0 {
            return;
        }

        // Create pixel buffer and z-buffer
        let mut pixel_data = vec![0u8; width * height * 4];
        let mut z_buffer = vec![f64::INFINITY; width * height];
        fill_rect(
            0,
            0,
            width,
            height,
            &mut pixel_data,
            width,
            height,
            BACKGROUND,
        );

        let pose_panel = Panel {
            x: 0,
            y: 0,
            w: width / 2,
            h: height,
        };
        let angle_panel = Panel {
            x: width / 2,
            y: 0,
            w: width - width / 2,
            h: height,
        };

        // Divider between the two panels.
        draw_line(
            pose_panel.w as f64,
            0.0,
            pose_panel.w as f64,
            height as f64,
            &mut pixel_data,
            width,
            height,
            PANEL_BORDER,
        );

        self.paint_pose_panel(&pose_panel, &mut pixel_data, &mut z_buffer, width, height);
        self.paint_angle_panel(&angle_panel, &mut pixel_data, width, height);

        // Create and draw the image
        let image = ctx
            .make_image(
                width,
                height,
                &pixel_data,
                druid::piet::ImageFormat::RgbaSeparate,
            )
            .unwrap();
        ctx.draw_image(&image, size.to_rect(), InterpolationMode::NearestNeighbor);

        // Panel titles and angle-axis annotations.
        self.draw_text(ctx, "3D Pose".to_string(), (10.0, 8.0), TEXT_COLOR);
        self.draw_text(
            ctx,
            "Rotation Angles".to_string(),
            (pose_panel.w as f64 + 10.0, 8.0),
            TEXT_COLOR,
        );

        let (frames_max, y_lo, y_hi) = angle_axis_bounds(self.session.window());
        let plot_left = angle_panel.x as f64 + 2.0;
        self.draw_text(ctx, format!("{:.0}", y_hi), (plot_left, 22.0), TEXT_COLOR);
        self.draw_text(
            ctx,
            format!("{:.0}", y_lo),
            (plot_left, height as f64 - 34.0),
            TEXT_COLOR,
        );
        self.draw_text(
            ctx,
            format!("0 .. {:.0} frames", frames_max),
            (angle_panel.x as f64 + 44.0, height as f64 - 22.0),
            TEXT_COLOR,
        );

        // Legend, in the series colors.
        let legend_x = (angle_panel.x + angle_panel.w) as f64 - 150.0;
        self.draw_text(ctx, "Yaw".to_string(), (legend_x, 8.0), YAW_COLOR);
        self.draw_text(ctx, "Pitch".to_string(), (legend_x + 44.0, 8.0), PITCH_COLOR);
        self.draw_text(ctx, "Roll".to_string(), (legend_x + 96.0, 8.0), ROLL_COLOR);

        if self.session.window().is_empty() {
            self.draw_text(
                ctx,
                "Waiting for sensor data...".to_string(),
                (pose_panel.w as f64 / 2.0 - 70.0, height as f64 / 2.0),
                TEXT_COLOR,
            );
        }

        // Add debug info if debug mode is enabled
        if data.debug {
            for (i, line) in self.debug_lines(data).into_iter().enumerate() {
                self.draw_text(ctx, line, (10.0, 28.0 + 18.0 * i as f64), TEXT_COLOR);
            }
        }

        // Display 'Paused' if polling is paused
        if data.paused {
            // Draw a semi-transparent overlay
            let overlay_color = Color::rgba8(0, 0, 0, 150);
            ctx.fill(size.to_rect(), &overlay_color);

            // Draw 'Paused' text
            let text = "Paused";
            let text_layout = ctx
                .text()
                .new_text_layout(text)
                .font(FontFamily::SYSTEM_UI, 36.0)
                .default_attribute(druid::piet::FontWeight::BOLD)
                .text_color(Color::WHITE)
                .build()
                .unwrap();
            let text_size = text_layout.size();
            let pos = (
                (size.width - text_size.width) / 2.0,
                (size.height - text_size.height) / 2.0,
            );
            ctx.draw_text(&text_layout, pos);
        }
    }
}
