//! Animated SVG rendering. The session is replayed once, sampled at no
//! faster than `config.fps`, and each distinct cell-grid state becomes a
//! `<defs>` fragment referenced by `<use>` — repeats of an earlier state (a
//! redrawn prompt, a cleared screen) cost only another `<use>`, not another
//! copy of the markup. Visibility over time is driven by CSS `@keyframes`,
//! the same declarative, no-script approach as the static renderer's plain
//! `write!`-built fragments.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};

use crate::config::Config;
use crate::crop::{self, ResolvedCrop};
use crate::error::Result;
use crate::recording::{EventKind, RecordingSession};
use crate::terminal::{AnsiParser, Row};
use crate::theme::{self, Theme};

use super::metrics::{fmt_num, FONT_SIZE};
use super::render_cells_fragment;

/// A fraction of a percentage point used to force a near-instant cut
/// between keyframe stops rather than a visible cross-fade.
const EPS_PCT: f64 = 0.02;

struct Sample {
    time: f64,
    fingerprint: u64,
    rows: Vec<Row>,
}

fn fingerprint_rows(rows: &[Row], crop: &ResolvedCrop) -> u64 {
    let mut hasher = DefaultHasher::new();
    for row in &rows[crop.start_row..crop.end_row] {
        for cell in &row.cells[crop.start_col as usize..crop.end_col as usize] {
            cell.text.hash(&mut hasher);
            cell.fg.hash(&mut hasher);
            cell.bg.hash(&mut hasher);
            cell.attrs.bits().hash(&mut hasher);
            cell.flags.bits().hash(&mut hasher);
        }
    }
    hasher.finish()
}

fn sample_at(time: f64, parser: &AnsiParser, crop: Option<&ResolvedCrop>) -> Sample {
    let rows: Vec<Row> = parser.screen().active_grid().rows.clone();
    // `crop` is `None` only for the first pass that determines the crop
    // window itself; the fingerprint there is never read.
    let fingerprint = crop.map(|c| fingerprint_rows(&rows, c)).unwrap_or(0);
    Sample { time, fingerprint, rows }
}

pub struct AnimatedSvgRenderer;

impl AnimatedSvgRenderer {
    /// Render `session` as a looping-or-once CSS animation honoring
    /// `config`'s fps/sleep/fade-out/loop settings, cropped and chromed the
    /// same way the static renderer is.
    pub fn render(session: &RecordingSession, config: &Config) -> Result<String> {
        let theme = theme::resolve(&config.theme)?;
        let width = session.header.width;
        let height = session.header.height;

        let frame_interval = if config.fps > 0.0 { 1.0 / config.fps } else { 0.0 };
        let mut parser = AnsiParser::new(width, height);
        let mut samples: Vec<Sample> = vec![sample_at(0.0, &parser, None)];

        let output_events: Vec<_> = session
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Output)
            .collect();
        let mut last_kept = f64::NEG_INFINITY;
        for (i, event) in output_events.iter().enumerate() {
            parser.feed(event.data.as_bytes());
            let is_last = i + 1 == output_events.len();
            if is_last || event.time - last_kept >= frame_interval {
                samples.push(sample_at(event.time, &parser, None));
                last_kept = event.time;
            }
        }

        // Crop is resolved once, against the final state: text-pattern
        // matching and row/column trimming apply to where the session
        // ended up, not to every transient intermediate frame.
        let final_rows: Vec<&Row> = samples.last().expect("seeded with an initial sample").rows.iter().collect();
        let resolved = crop::resolve(
            &final_rows,
            width,
            &config.crop,
            config.chrome.inset(),
            config.padding,
            config.min_rows,
        );
        for sample in &mut samples {
            sample.fingerprint = fingerprint_rows(&sample.rows, &resolved);
        }

        Ok(assemble(&samples, &resolved, &theme, config))
    }
}

fn assemble(samples: &[Sample], crop: &ResolvedCrop, theme: &Theme, config: &Config) -> String {
    let mut fragment_ids: HashMap<u64, usize> = HashMap::new();
    let mut defs = String::new();

    // `<defs>` dedup happens here, keyed on content fingerprint. It must stay
    // independent of how many frames are sampled: two frames with identical
    // content still produce two `<use>` references below, just against the
    // same `fd-<k>` fragment.
    let frame_fragment_ids: Vec<usize> = samples
        .iter()
        .map(|sample| {
            if let Some(&id) = fragment_ids.get(&sample.fingerprint) {
                id
            } else {
                let id = fragment_ids.len();
                let rows: Vec<&Row> = sample.rows.iter().collect();
                let fragment = render_cells_fragment(&rows, crop, theme);
                let _ = write!(defs, "<g id=\"fd-{id}\">{fragment}</g>");
                fragment_ids.insert(sample.fingerprint, id);
                id
            }
        })
        .collect();

    let last_event_time = samples.last().map(|s| s.time).unwrap_or(0.0);
    let hold_end = last_event_time + config.sleep.max(0.0);
    let total = (hold_end + config.fade_out.max(0.0)).max(0.001);

    let pct = |t: f64| (t / total * 100.0).clamp(0.0, 100.0);
    let mut style = String::new();
    let mut content = String::new();
    let iteration = if config.loop_animation { "infinite" } else { "1" };
    let n_frames = samples.len();

    // One `@keyframes`/`.frame-i` block per sampled frame, never per
    // content-run — a frame that repeats an earlier state still gets its
    // own timeline slot, just referencing the same `<defs>` fragment.
    for (i, sample) in samples.iter().enumerate() {
        let class = format!("frame-{i}");
        let start_pct = pct(sample.time);
        let appear_pct = (start_pct + EPS_PCT).min(100.0);
        let is_last = i + 1 == n_frames;

        if is_last {
            let hold_pct = pct(hold_end);
            let fade_tail = if config.fade_out > 0.0 { 0.0 } else { 1.0 };
            let _ = write!(
                style,
                ".{class}{{animation:{class}-k {total}s linear {iteration};animation-fill-mode:forwards;}}\
@keyframes {class}-k{{0%{{opacity:0;}}{start}%{{opacity:0;}}{appear}%{{opacity:1;}}{hold}%{{opacity:1;}}100%{{opacity:{fade_tail};}}}}",
                total = fmt_num(total),
                class = class,
                start = fmt_num(start_pct),
                appear = fmt_num(appear_pct),
                hold = fmt_num(hold_pct.max(appear_pct)),
                fade_tail = fmt_num(fade_tail),
            );
        } else {
            let end_pct = pct(samples[i + 1].time);
            let disappear_pct = (end_pct - EPS_PCT).max(appear_pct);
            let _ = write!(
                style,
                ".{class}{{animation:{class}-k {total}s linear {iteration};animation-fill-mode:forwards;}}\
@keyframes {class}-k{{0%{{opacity:0;}}{start}%{{opacity:0;}}{appear}%{{opacity:1;}}{disappear}%{{opacity:1;}}{end}%{{opacity:0;}}100%{{opacity:0;}}}}",
                total = fmt_num(total),
                class = class,
                start = fmt_num(start_pct),
                appear = fmt_num(appear_pct),
                disappear = fmt_num(disappear_pct),
                end = fmt_num(end_pct),
            );
        }

        let _ = write!(
            content,
            "<use href=\"#fd-{}\" class=\"{class}\" />",
            frame_fragment_ids[i]
        );
    }

    let chrome_fragment = config.chrome.render(crop.canvas_width, crop.canvas_height);
    let background_fragment = config.background.render(crop.canvas_width, crop.canvas_height);

    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {cw} {ch}\" width=\"{cw}\" height=\"{ch}\" \
opacity=\"{opacity}\" role=\"img\" aria-label=\"console2svg output\">\
<style>text.crt {{ font-family: {font}; font-size: {font_size}px; white-space: pre; }}{anim_style}</style>\
<defs>{defs}</defs>\
{background}{chrome}\
<g transform=\"translate({ox}, {oy})\">{content}</g>\
</svg>",
        cw = fmt_num(crop.canvas_width),
        ch = fmt_num(crop.canvas_height),
        opacity = fmt_num(config.opacity as f64),
        font = config.font_family,
        font_size = fmt_num(FONT_SIZE),
        anim_style = style,
        defs = defs,
        background = background_fragment,
        chrome = chrome_fragment,
        ox = fmt_num(crop.content_offset_x),
        oy = fmt_num(crop.content_offset_y),
        content = content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::recording::RecordingSession;

    fn session_with(events: &[(f64, &str)], w: u16, h: u16) -> RecordingSession {
        let mut s = RecordingSession::new(w, h, 0);
        for (t, text) in events {
            s.push_output(*t, text.to_string());
        }
        s
    }

    #[test]
    fn repeated_state_reuses_one_defs_fragment() {
        let session = session_with(&[(0.0, "Hi"), (0.5, "\x1b[2J\x1b[HHi")], 8, 2);
        let config = Config::default();
        let svg = AnimatedSvgRenderer::render(&session, &config).unwrap();
        // Three sampled frames (the blank initial screen, then "Hi" printed
        // twice across the clear-and-reprint) collapse to two <defs>
        // fragments: one for blank, one shared by both "Hi" frames.
        assert_eq!(svg.matches("<g id=\"fd-").count(), 2);
        assert_eq!(svg.matches("<use href=\"#fd-1\"").count(), 2);
    }

    #[test]
    fn distinct_states_produce_distinct_fragments() {
        let session = session_with(&[(0.0, "A"), (0.5, "\x1b[2J\x1b[HB")], 8, 2);
        let config = Config::default();
        let svg = AnimatedSvgRenderer::render(&session, &config).unwrap();
        assert!(svg.contains(">A<"));
        assert!(svg.contains(">B<"));
        assert!(svg.matches("<g id=\"fd-").count() >= 2);
    }

    #[test]
    fn looping_uses_infinite_iteration_count() {
        let session = session_with(&[(0.0, "Hi")], 8, 2);
        let mut config = Config::default();
        config.loop_animation = true;
        let svg = AnimatedSvgRenderer::render(&session, &config).unwrap();
        assert!(svg.contains("infinite"));
    }

    #[test]
    fn zero_events_still_renders_a_held_frame() {
        let session = RecordingSession::new(8, 2, 0);
        let config = Config::default();
        let svg = AnimatedSvgRenderer::render(&session, &config).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<use href=\"#fd-0\""));
    }
}
