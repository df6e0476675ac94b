//! System prompt, context serialisation and canned fallback lines.

use crate::flow::{CardStep, ChoiceValue, FlowStep, JourneyStep, Situation};

use super::context::AdvisoryContext;

/// Fixed instruction sent ahead of every request.
pub const SYSTEM_PROMPT: &str = "\
You are the Setly Assistant, a calm, intelligent guide for someone settling into a new place.

Core behavior:
- Respond ONLY to user actions (card selections, step completions)
- Never repeat yourself; every message must be unique
- Max 2 sentences per response
- Acknowledge emotions naturally (\"That makes sense given...\")
- Ask ONE thoughtful follow-up question when appropriate

Your knowledge:
Setly provides: verified housing, roommate matching, transport/rides, essentials marketplace, local community connections.

Your goal:
Help them feel understood and guided, not sold to. Be human, brief, and useful.

CRITICAL: Never say the same thing twice. Check previous messages before responding.";

/// Generic line used when nothing in the context matches.
pub const DEFAULT_FALLBACK: &str =
    "I'm here to help you settle in. What matters most to you right now?";

/// Turn the context into the user turn of the request.
pub fn context_prompt(ctx: &AdvisoryContext) -> String {
    let mut parts = Vec::new();

    if let Some(choice) = ctx.entry_choice {
        let described = match choice {
            ChoiceValue::Landed => "just landed and doesn't know where to start",
            ChoiceValue::Housing => "needs a place to stay urgently",
            ChoiceValue::Essentials => "needs transport and essentials",
            ChoiceValue::Community => "doesn't want to feel alone",
        };
        parts.push(format!("User chose: \"{described}\""));
    }

    if let Some(ref step) = ctx.current_step {
        parts.push(format!("Current step: {step}"));
    }

    if let Some(situation) = ctx.situation {
        parts.push(format!("Situation selected: {situation}"));
    }

    if !ctx.selected_features().is_empty() {
        let features: Vec<String> = ctx.selected_features().iter().map(|f| f.to_string()).collect();
        parts.push(format!("Explored features: {}", features.join(", ")));
    }

    if !ctx.completed_steps().is_empty() {
        parts.push(format!("Completed steps: {}", ctx.completed_steps().join(", ")));
    }

    format!(
        "{}\n\nProvide a brief, empathetic response acknowledging their choice and what happens next.",
        parts.join("\n")
    )
}

/// Deterministic canned line, keyed by entry choice, then situation, then
/// completion of a flow's final step.
pub fn fallback_message(ctx: &AdvisoryContext) -> &'static str {
    if let Some(choice) = ctx.entry_choice {
        return match choice {
            ChoiceValue::Landed => {
                "You just landed. Most people feel overwhelmed at this point, and you're not alone. Let me help you figure out what comes next."
            }
            ChoiceValue::Housing => {
                "Got it, housing feels urgent. This is usually the hardest part. Let me show you how we simplify it."
            }
            ChoiceValue::Essentials => {
                "Getting around and getting set up comes first. Let me show you how people here share rides and find what they need."
            }
            ChoiceValue::Community => {
                "Feeling alone in a new place is real. Let me show you how people here find each other."
            }
        };
    }

    if let Some(situation) = ctx.situation {
        return match situation {
            Situation::Room => {
                "Looking for verified housing. Here's what changes when you have the right help."
            }
            Situation::Rides => {
                "Rides add up fast. Here's how splitting them with people nearby changes things."
            }
            Situation::Essentials => {
                "Buying everything new isn't the only way. Here's how locals pass things on."
            }
            Situation::People => "Meeting people takes time. Here's where it starts.",
            Situation::Landed => {
                "First days are a lot. Here's what usually matters first."
            }
        };
    }

    if ctx.has_completed(JourneyStep::last()) || ctx.has_completed(CardStep::last()) {
        return "You've walked through the journey. Now you know what Setly can do, and you don't have to figure this out alone.";
    }

    DEFAULT_FALLBACK
}
