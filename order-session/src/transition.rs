//! The transition table: `(state, input) → (next, effect, prompt)`.
//!
//! Pure; the engine applies the effect to the session, moves it, and renders the prompt.

use date_resolver::ResolvedDate;

use crate::state::{Command, Input, OrderState};

/// Where the conversation goes after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Stay,
    To(OrderState),
    /// Build the order snapshot and destroy the session.
    Finalize,
    /// Destroy the session without an order.
    Cancel,
}

/// What to change on the session before moving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Append the message text (as a fragment) and image (as an attachment), whichever are present.
    AppendContent,
    /// Derive a title from the first fragment if none is set yet.
    ProposeTitle,
    /// Keep the proposed title as the final one.
    LockTitle,
    /// Use the message text as the title.
    SetTitle,
    SetDeliveryDate(ResolvedDate),
}

/// Which reply to render after the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    StartConfirmation,
    MoreContent,
    SendContent,
    TitleConfirmation,
    WriteTitle,
    DeliveryDate,
    DeliveryDateRetry,
    Declined,
    Cancelled,
    Finalized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Next,
    pub effect: Effect,
    pub prompt: Prompt,
}

impl Transition {
    fn new(next: Next, effect: Effect, prompt: Prompt) -> Self {
        Self { next, effect, prompt }
    }
}

/// Decides the transition for `input` in `state`. Cancel is checked before anything state-specific.
pub fn transition(state: OrderState, input: &Input) -> Transition {
    use Command::*;
    use OrderState::*;

    if let Input::Command(Cancel) = input {
        return Transition::new(Next::Cancel, Effect::None, Prompt::Cancelled);
    }

    match (state, input) {
        (AwaitingStartConfirmation, Input::Command(Affirmative)) => {
            Transition::new(Next::To(AwaitingMoreContent), Effect::None, Prompt::MoreContent)
        }
        (AwaitingStartConfirmation, Input::Command(Negative)) => {
            Transition::new(Next::Cancel, Effect::None, Prompt::Declined)
        }
        (AwaitingStartConfirmation, Input::Empty) => {
            Transition::new(Next::Stay, Effect::None, Prompt::StartConfirmation)
        }
        (AwaitingStartConfirmation, _) => {
            Transition::new(Next::Stay, Effect::AppendContent, Prompt::StartConfirmation)
        }

        (AwaitingMoreContent, Input::Command(Affirmative)) => {
            Transition::new(Next::To(CollectingContent), Effect::None, Prompt::SendContent)
        }
        (AwaitingMoreContent, Input::Command(Negative)) => Transition::new(
            Next::To(AwaitingTitleConfirmation),
            Effect::ProposeTitle,
            Prompt::TitleConfirmation,
        ),
        (AwaitingMoreContent, Input::Empty) => {
            Transition::new(Next::Stay, Effect::None, Prompt::MoreContent)
        }
        (AwaitingMoreContent, _) => {
            Transition::new(Next::Stay, Effect::AppendContent, Prompt::MoreContent)
        }

        (CollectingContent, _) => Transition::new(
            Next::To(AwaitingMoreContent),
            Effect::AppendContent,
            Prompt::MoreContent,
        ),

        (AwaitingTitleConfirmation, Input::Command(Affirmative)) => Transition::new(
            Next::To(AwaitingDeliveryDate),
            Effect::LockTitle,
            Prompt::DeliveryDate,
        ),
        (AwaitingTitleConfirmation, Input::Command(Change)) => {
            Transition::new(Next::To(WritingTitle), Effect::None, Prompt::WriteTitle)
        }
        (AwaitingTitleConfirmation, _) => {
            Transition::new(Next::Stay, Effect::None, Prompt::TitleConfirmation)
        }

        (WritingTitle, Input::Empty) | (WritingTitle, Input::ImageOnly) => {
            Transition::new(Next::Stay, Effect::None, Prompt::WriteTitle)
        }
        (WritingTitle, _) => Transition::new(
            Next::To(AwaitingDeliveryDate),
            Effect::SetTitle,
            Prompt::DeliveryDate,
        ),

        (AwaitingDeliveryDate, Input::Date(date)) => Transition::new(
            Next::Finalize,
            Effect::SetDeliveryDate(date.clone()),
            Prompt::Finalized,
        ),
        (AwaitingDeliveryDate, _) => {
            Transition::new(Next::Stay, Effect::None, Prompt::DeliveryDateRetry)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    const ALL_STATES: [OrderState; 6] = [
        OrderState::AwaitingStartConfirmation,
        OrderState::AwaitingMoreContent,
        OrderState::CollectingContent,
        OrderState::AwaitingTitleConfirmation,
        OrderState::WritingTitle,
        OrderState::AwaitingDeliveryDate,
    ];

    fn some_date() -> ResolvedDate {
        let offset = FixedOffset::west_opt(4 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        ResolvedDate::at(day, None, &offset, "mañana").unwrap()
    }

    #[test]
    fn test_cancel_wins_in_every_state() {
        for state in ALL_STATES {
            let t = transition(state, &Input::Command(Command::Cancel));
            assert_eq!(t.next, Next::Cancel, "{state}");
            assert_eq!(t.prompt, Prompt::Cancelled);
        }
    }

    #[test]
    fn test_start_confirmation() {
        let s = OrderState::AwaitingStartConfirmation;
        assert_eq!(
            transition(s, &Input::Command(Command::Affirmative)).next,
            Next::To(OrderState::AwaitingMoreContent)
        );
        let declined = transition(s, &Input::Command(Command::Negative));
        assert_eq!(declined.next, Next::Cancel);
        assert_eq!(declined.prompt, Prompt::Declined);
        let more = transition(s, &Input::Text);
        assert_eq!(more.next, Next::Stay);
        assert_eq!(more.effect, Effect::AppendContent);
        assert_eq!(transition(s, &Input::Command(Command::Change)).effect, Effect::AppendContent);
    }

    #[test]
    fn test_more_content() {
        let s = OrderState::AwaitingMoreContent;
        assert_eq!(
            transition(s, &Input::Command(Command::Affirmative)).next,
            Next::To(OrderState::CollectingContent)
        );
        let done = transition(s, &Input::Command(Command::Negative));
        assert_eq!(done.next, Next::To(OrderState::AwaitingTitleConfirmation));
        assert_eq!(done.effect, Effect::ProposeTitle);
        assert_eq!(transition(s, &Input::ImageOnly).effect, Effect::AppendContent);
    }

    #[test]
    fn test_collecting_always_appends_and_returns() {
        for input in [
            Input::Text,
            Input::ImageOnly,
            Input::Empty,
            Input::Command(Command::Affirmative),
            Input::Command(Command::Negative),
        ] {
            let t = transition(OrderState::CollectingContent, &input);
            assert_eq!(t.next, Next::To(OrderState::AwaitingMoreContent));
            assert_eq!(t.effect, Effect::AppendContent);
        }
    }

    #[test]
    fn test_title_confirmation_captures_nothing() {
        let s = OrderState::AwaitingTitleConfirmation;
        let t = transition(s, &Input::Text);
        assert_eq!(t.next, Next::Stay);
        assert_eq!(t.effect, Effect::None);
        assert_eq!(
            transition(s, &Input::Command(Command::Change)).next,
            Next::To(OrderState::WritingTitle)
        );
        assert_eq!(transition(s, &Input::Command(Command::Affirmative)).effect, Effect::LockTitle);
    }

    #[test]
    fn test_writing_title() {
        let s = OrderState::WritingTitle;
        assert_eq!(transition(s, &Input::Empty).next, Next::Stay);
        assert_eq!(transition(s, &Input::ImageOnly).next, Next::Stay);
        let t = transition(s, &Input::Command(Command::Affirmative));
        assert_eq!(t.effect, Effect::SetTitle);
        assert_eq!(t.next, Next::To(OrderState::AwaitingDeliveryDate));
    }

    #[test]
    fn test_delivery_date() {
        let s = OrderState::AwaitingDeliveryDate;
        let done = transition(s, &Input::Date(some_date()));
        assert_eq!(done.next, Next::Finalize);
        assert_eq!(done.effect, Effect::SetDeliveryDate(some_date()));
        let retry = transition(s, &Input::Text);
        assert_eq!(retry.next, Next::Stay);
        assert_eq!(retry.prompt, Prompt::DeliveryDateRetry);
    }
}
