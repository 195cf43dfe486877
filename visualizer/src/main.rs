use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke, Text},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use phasercore::prelude::SweepSample;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BRIDGE_URL: &str = "http://127.0.0.1:9000";

/// Vertical extent of the plot below the strongest sample.
const PLOT_SPAN_DB: f32 = 40.0;

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Phaser Beam Sweep".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    scene: SceneForm,
    payload: Option<PatternPayload>,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    PayloadFetched(Result<PatternPayload, String>),
    SceneFieldChanged(SceneField, String),
    SubmitScene,
    SceneSubmitted(Result<String, String>),
}

#[derive(Debug, Clone, Copy)]
enum SceneField {
    SourceAngle,
    Amplitude,
    ToneOffset,
    Noise,
    Seed,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                scene: SceneForm::default(),
                payload: None,
                status: "Waiting for a beam pattern...".into(),
                history: Vec::new(),
            },
            Task::perform(fetch_pattern(), Message::PayloadFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_pattern(), Message::PayloadFetched),
            Message::PayloadFetched(Ok(payload)) => {
                let changed = state
                    .payload
                    .as_ref()
                    .map(|current| current.peak_dbfs != payload.peak_dbfs)
                    .unwrap_or(true);
                if changed && !payload.angles_deg.is_empty() {
                    state.push_history(format!(
                        "Pattern: {} points, peak {}",
                        payload.angles_deg.len(),
                        payload.peak_summary()
                    ));
                }
                state.status = format!("Pattern received: {} points", payload.angles_deg.len());
                state.payload = Some(payload);
                Task::none()
            }
            Message::PayloadFetched(Err(err)) => {
                state.status = format!("Bridge error: {err}");
                Task::none()
            }
            Message::SceneFieldChanged(field, value) => {
                state.scene.update_field(field, value);
                Task::none()
            }
            Message::SubmitScene => {
                state.status = "Sweeping...".into();
                Task::perform(post_scene(state.scene.to_payload()), Message::SceneSubmitted)
            }
            Message::SceneSubmitted(Ok(message)) => {
                state.status = message;
                state.push_history("Scene submitted".into());
                Task::none()
            }
            Message::SceneSubmitted(Err(err)) => {
                state.status = format!("Sweep error: {err}");
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let scene_column = column![
            text("Simulated Scene").size(26),
            text_input("Source angle (deg)", &state.scene.source_angle)
                .on_input(|value| Message::SceneFieldChanged(SceneField::SourceAngle, value))
                .padding(6),
            text_input("Amplitude (codes)", &state.scene.amplitude)
                .on_input(|value| Message::SceneFieldChanged(SceneField::Amplitude, value))
                .padding(6),
            text_input("Tone offset (Hz)", &state.scene.tone_offset)
                .on_input(|value| Message::SceneFieldChanged(SceneField::ToneOffset, value))
                .padding(6),
            text_input("Noise (codes)", &state.scene.noise)
                .on_input(|value| Message::SceneFieldChanged(SceneField::Noise, value))
                .padding(6),
            text_input("Seed", &state.scene.seed)
                .on_input(|value| Message::SceneFieldChanged(SceneField::Seed, value))
                .padding(6),
            button("Run sweep").on_press(Message::SubmitScene).padding(10),
            text(&state.status).size(14),
            column![
                text("Parameter definitions").size(16),
                text("Source angle: direction of the transmitter, degrees off boresight.")
                    .size(12),
                text("Amplitude: tone level at each element, in ADC codes (full scale 2048).")
                    .size(12),
                text("Tone offset: baseband frequency of the tone after the mixer.").size(12),
                text("Noise: uniform noise added to I and Q, in ADC codes.").size(12),
                text("Seed: deterministic noise so sweeps replay identically.").size(12),
            ]
            .spacing(4)
            .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(340.0));

        let summary = if let Some(payload) = &state.payload {
            text(format!(
                "{:.4} GHz | peak {} | -3 dB width {}",
                payload.signal_freq_hz / 1e9,
                payload.peak_summary(),
                payload
                    .beamwidth_deg
                    .map(|w| format!("{w:.1} deg"))
                    .unwrap_or_else(|| "n/a".into())
            ))
            .size(18)
        } else {
            text("No pattern yet").size(18)
        };
        let scene_summary = text(
            state
                .payload
                .as_ref()
                .map(PatternPayload::scene_summary)
                .unwrap_or_default(),
        )
        .size(14);

        let samples = state
            .payload
            .as_ref()
            .map(PatternPayload::samples)
            .unwrap_or_default();
        let plot = Canvas::new(BeamPlot { samples })
            .width(Length::Fill)
            .height(Length::Fixed(360.0));

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let pattern_column = column![
            text("Beam sweep plot").size(26),
            summary,
            scene_summary,
            text("Peak amplitude (dBFS) vs. steering angle (deg)").size(16),
            plot,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(120.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![scene_column, pattern_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

async fn fetch_pattern() -> Result<PatternPayload, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/pattern"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<PatternPayload>()
        .await
        .map_err(|e| e.to_string())
}

async fn post_scene(scene: ScenePayload) -> Result<String, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{BRIDGE_URL}/sweep"))
        .json(&scene)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok("Sweep complete".into())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(format!("{}: {}", status, text))
    }
}

#[derive(Debug, Clone)]
struct SceneForm {
    source_angle: String,
    amplitude: String,
    tone_offset: String,
    noise: String,
    seed: String,
}

impl SceneForm {
    fn default() -> Self {
        Self {
            source_angle: "0".into(),
            amplitude: "60".into(),
            tone_offset: "20000".into(),
            noise: "1".into(),
            seed: "7".into(),
        }
    }

    fn update_field(&mut self, field: SceneField, value: String) {
        match field {
            SceneField::SourceAngle => self.source_angle = value,
            SceneField::Amplitude => self.amplitude = value,
            SceneField::ToneOffset => self.tone_offset = value,
            SceneField::Noise => self.noise = value,
            SceneField::Seed => self.seed = value,
        }
    }

    fn to_payload(&self) -> ScenePayload {
        ScenePayload {
            source_angle_deg: self.source_angle.trim().parse().ok(),
            amplitude_codes: self.amplitude.trim().parse().ok(),
            tone_offset_hz: self.tone_offset.trim().parse().ok(),
            noise_codes: self.noise.trim().parse().ok(),
            seed: self.seed.trim().parse().ok(),
        }
    }
}

/// Unparsable fields are left out so the bridge falls back to its defaults.
#[derive(Debug, Serialize)]
struct ScenePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    source_angle_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amplitude_codes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone_offset_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    noise_codes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct PatternPayload {
    #[serde(default)]
    angles_deg: Vec<f64>,
    #[serde(default)]
    peak_dbfs: Vec<f64>,
    #[serde(default)]
    signal_freq_hz: f64,
    #[serde(default)]
    peak_angle_deg: Option<f64>,
    #[serde(default)]
    peak_value_dbfs: Option<f64>,
    #[serde(default)]
    beamwidth_deg: Option<f64>,
    #[serde(default)]
    scene: Option<SceneEcho>,
}

/// Scene the bridge swept to produce the current pattern.
#[derive(Debug, Clone, Deserialize)]
struct SceneEcho {
    source_angle_deg: f64,
    amplitude_codes: f64,
    tone_offset_hz: f64,
    noise_codes: f64,
    seed: u64,
}

impl PatternPayload {
    fn samples(&self) -> Vec<SweepSample> {
        self.angles_deg
            .iter()
            .zip(self.peak_dbfs.iter())
            .map(|(&angle_deg, &peak_dbfs)| SweepSample {
                angle_deg,
                peak_dbfs,
            })
            .collect()
    }

    fn peak_summary(&self) -> String {
        match (self.peak_value_dbfs, self.peak_angle_deg) {
            (Some(value), Some(angle)) => format!("{value:.2} dBFS at {angle:.1} deg"),
            _ => "n/a".into(),
        }
    }

    fn scene_summary(&self) -> String {
        match &self.scene {
            Some(scene) => format!(
                "Source {:.1} deg, {:.0} codes, tone {:.0} Hz, noise {:.1}, seed {}",
                scene.source_angle_deg,
                scene.amplitude_codes,
                scene.tone_offset_hz,
                scene.noise_codes,
                scene.seed
            ),
            None => "Scene unknown".into(),
        }
    }
}

#[derive(Clone)]
struct BeamPlot {
    samples: Vec<SweepSample>,
}

impl BeamPlot {
    fn to_point(&self, bounds: Rectangle, angle_deg: f64, dbfs: f32, top_db: f32) -> Point {
        let x = ((angle_deg as f32 + 90.0) / 180.0).clamp(0.0, 1.0) * bounds.width;
        let normalized = ((dbfs - (top_db - PLOT_SPAN_DB)) / PLOT_SPAN_DB).clamp(0.0, 1.0);
        Point::new(x, bounds.height - normalized * bounds.height)
    }
}

impl canvas::Program<Message> for BeamPlot {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let top_db = self
            .samples
            .iter()
            .map(|s| s.peak_dbfs as f32)
            .fold(f32::NEG_INFINITY, f32::max);
        // round the top of the plot up to the next 10 dB line
        let top_db = if top_db.is_finite() {
            (top_db / 10.0).ceil() * 10.0
        } else {
            0.0
        };

        let grid_color = Color::from_rgb(0.25, 0.25, 0.3);
        for tick in (-90..=90).step_by(30) {
            let x = self.to_point(bounds, f64::from(tick), top_db, top_db).x;
            let line = Path::line(Point::new(x, 0.0), Point::new(x, bounds.height));
            frame.stroke(&line, Stroke::default().with_color(grid_color));
            frame.fill_text(Text {
                content: format!("{tick}"),
                position: Point::new(x + 2.0, bounds.height - 14.0),
                color: grid_color,
                ..Text::default()
            });
        }
        for step in 0..=4 {
            let level = top_db - step as f32 * 10.0;
            let y = self.to_point(bounds, 0.0, level, top_db).y;
            let line = Path::line(Point::new(0.0, y), Point::new(bounds.width, y));
            frame.stroke(&line, Stroke::default().with_color(grid_color));
            frame.fill_text(Text {
                content: format!("{level:.0}"),
                position: Point::new(2.0, y + 2.0),
                color: grid_color,
                ..Text::default()
            });
        }

        if self.samples.len() > 1 {
            let path = Path::new(|builder| {
                for (i, sample) in self.samples.iter().enumerate() {
                    let point =
                        self.to_point(bounds, sample.angle_deg, sample.peak_dbfs as f32, top_db);
                    if i == 0 {
                        builder.move_to(point);
                    } else {
                        builder.line_to(point);
                    }
                }
            });
            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.5)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );

            for sample in &self.samples {
                let point =
                    self.to_point(bounds, sample.angle_deg, sample.peak_dbfs as f32, top_db);
                let marker = Path::circle(point, 1.5);
                frame.fill(&marker, Color::from_rgb(0.95, 0.55, 0.2));
            }
        }

        vec![frame.into_geometry()]
    }
}
