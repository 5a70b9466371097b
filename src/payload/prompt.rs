//! Coaching prompt text.
//!
//! Everything here is a pure function of the [`AnalysisContext`], the number
//! of frames and the sampling interval, so identical inputs give identical
//! text.

use super::context::{ActivityCategory, AnalysisContext};

/// Technical issue categories, indexed by the numeric code the model reports.
pub const ISSUE_CATEGORIES: [&str; 5] = [
    "edge transitions",
    "center of gravity",
    "body coordination",
    "pole usage",
    "stance width",
];

/// Code of the category that has no meaning on a snowboard.
const POLE_USAGE: usize = 3;

/// Reported time of an issue first visible on 1-indexed frame `frame`.
pub fn first_occurrence_time(frame: usize, interval: f64) -> f64 {
    frame.saturating_sub(1) as f64 * interval
}

/// Seconds rendered with at most two decimals and no trailing zeros beyond one.
pub fn format_seconds(seconds: f64) -> String {
    let mut s = format!("{:.2}", seconds);
    if s.ends_with('0') {
        s.pop();
    }
    s
}

pub fn system_prompt(ctx: &AnalysisContext) -> String {
    format!(
        "You are a professional {discipline} coach certified under the {standard} teaching system. \
         Evaluate the {athlete} strictly in {standard} terminology and against {standard} technical standards. {guidance}",
        discipline = ctx.category.discipline(),
        standard = ctx.standard,
        athlete = ctx.category.athlete(),
        guidance = ctx.focus_guidance(),
    )
}

pub fn user_prompt(ctx: &AnalysisContext, frame_count: usize, interval: f64) -> String {
    let athlete = ctx.category.athlete();
    let dt = format_seconds(interval);
    let mut text = format!(
        "Analyze the {athlete}'s performance based on the following sequence of {frame_count} video frames, \
         sampled {dt}s apart in chronological order.\n"
    );
    text.push_str("Return your analysis as a JSON object with the following fields:\n\n");
    text.push_str(
        "1. issue_count: the total number of distinct issue types, using only these technical categories (code: name):\n",
    );
    for (code, name) in ISSUE_CATEGORIES.iter().enumerate() {
        text.push_str(&format!("   - {code}: {name}"));
        if code == POLE_USAGE && ctx.category == ActivityCategory::Snowboard {
            text.push_str(" (snowboarders use no poles; normally this category does not apply)");
        }
        text.push('\n');
    }
    text.push_str("   Do not use vague terms like 'poor posture' or 'unstable balance'.\n\n");

    text.push_str("2. issues: a list of objects, one per issue type, each with:\n");
    text.push_str("   - type: the numeric category code (0-4) from the list above.\n");
    text.push_str("   - description: a short explanation of what was observed.\n");
    text.push_str(&format!(
        "   - time: the timestamp in seconds of the first frame showing the issue. \
         Frame i (1-indexed) is at time (i - 1) x {dt}s.\n"
    ));
    text.push_str(&format!(
        "     Group frames showing the same issue type into one issue and use the first frame of the run. \
         Example: if frames 4-6 show the same issue, time = {}.\n",
        format_seconds(first_occurrence_time(4, interval)),
    ));
    text.push_str(&format!(
        "   - suggestion: a concrete correction or drill, phrased in {} terms.\n\n",
        ctx.standard
    ));
    text.push_str("3. score: a number from 0 to 100 evaluating technique, consistency and safety.\n");
    text.push_str("4. score_reason: a concise explanation of the score.\n\n");

    text.push_str("Example:\n");
    text.push_str(&format!(
        "{{\"issue_count\": 1, \"issues\": [{{\"type\": 1, \"description\": \"Weight drifts back in frames 3-5.\", \
         \"time\": {}, \"suggestion\": \"Press the shins into the boot tongues through the turn.\"}}], \
         \"score\": 78, \"score_reason\": \"Solid rhythm, but the backseat stance limits control.\"}}\n\n",
        format_seconds(first_occurrence_time(3, interval)),
    ));
    text.push_str(
        "Respond with the JSON object only. Do not wrap it in code fences and do not add any text before or after it.",
    );
    text
}
