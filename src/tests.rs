//! Scenarios that go through the whole answer path, from raw query text to the
//! article handed to the platform, plus the `/link` dialogue storage.

use teloxide::{
    dispatching::dialogue::{Dialogue, InMemStorage},
    types::{ChatId, InlineKeyboardButtonKind, InputMessageContent},
};

use crate::callback::{react, CallbackAction};
use crate::config::test_config;
use crate::functions::advance;
use crate::misc::{LinkDialogue, State};
use crate::query::Outcome;
use crate::responder::{respond, Response};

fn message_text(response: &Response) -> &str {
    match &response.article.input_message_content {
        InputMessageContent::Text(text) => &text.message_text,
        other => panic!("unexpected content {other:?}"),
    }
}

fn button_count(response: &Response) -> usize {
    response
        .article
        .reply_markup
        .as_ref()
        .map(|markup| markup.inline_keyboard.iter().map(Vec::len).sum())
        .unwrap_or(0)
}

mod inline_answers {
    use super::*;

    #[test]
    fn success_with_custom_code() {
        let config = test_config(&[("AUTH_CODE", "4242")]);
        let response = respond("4242 alice", &config).unwrap();

        assert_eq!(response.outcome, Outcome::Success);
        assert!(message_text(&response).contains("alice"));
        assert_eq!(button_count(&response), 1);
    }

    #[test]
    fn empty_query_gets_instructions() {
        let config = test_config(&[("AUTH_CODE", "4242")]);
        let response = respond("", &config).unwrap();

        assert_eq!(response.outcome, Outcome::Instructions);
        assert_eq!(button_count(&response), 0);
    }

    #[test]
    fn default_code_is_1234() {
        let config = test_config(&[]);
        assert_eq!(respond("1234", &config).unwrap().outcome, Outcome::PayloadRequired);
        assert_eq!(respond("1234 x", &config).unwrap().outcome, Outcome::Success);
    }

    #[test]
    fn wrong_code_is_echoed_and_markup_is_tolerated() {
        let config = test_config(&[]);
        for payload in ["_", "<", "*", "<script>", "a_b*c<d>&"] {
            let response = respond(&format!("0000 {payload}"), &config).unwrap();
            assert_eq!(response.outcome, Outcome::WrongCode);
            assert!(message_text(&response).contains("0000"));
        }

        let response = respond("1234 <i>_x_</i>", &config).unwrap();
        assert_eq!(response.outcome, Outcome::Success);
        assert!(!message_text(&response).contains("<i>"));
    }

    #[test]
    fn same_input_same_outcome() {
        let config = test_config(&[]);
        let first = respond("1234 bob", &config).unwrap();
        let second = respond("1234 bob", &config).unwrap();

        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.article.title, second.article.title);
        assert_eq!(message_text(&first), message_text(&second));
        assert_eq!(first.article.reply_markup, second.article.reply_markup);
    }

    #[test]
    fn button_kind_follows_config() {
        let config = test_config(&[("BUTTON_KIND", "web_app")]);
        let response = respond("1234 carol", &config).unwrap();
        let markup = response.article.reply_markup.unwrap();
        assert!(matches!(
            markup.inline_keyboard[0][0].kind,
            InlineKeyboardButtonKind::WebApp(_)
        ));
    }
}

mod callback_buttons {
    use super::*;

    #[test]
    fn every_offered_button_works_when_pressed() {
        let config = test_config(&[("BUTTON_KIND", "callback")]);
        let mut offered = 0;

        for len in 1..=64 {
            let username = "u".repeat(len);
            let Ok(response) = respond(&format!("1234 {username}"), &config) else {
                continue;
            };
            let markup = response.article.reply_markup.expect("success has a button");
            let InlineKeyboardButtonKind::CallbackData(data) = &markup.inline_keyboard[0][0].kind
            else {
                panic!("expected a callback button");
            };

            let action = CallbackAction::decode(data).unwrap();
            assert!(
                react(&action, &config).is_ok(),
                "button for a {len}-byte username fails when pressed"
            );
            offered += 1;
        }

        assert_eq!(offered, 43);
    }
}

mod link_dialogue {
    use super::*;

    fn dialogue(chat: i64) -> LinkDialogue {
        Dialogue::new(InMemStorage::<State>::new(), ChatId(chat))
    }

    #[tokio::test]
    async fn new_users_start_at_the_beginning() {
        let dialogue = dialogue(1);
        assert_eq!(dialogue.get_or_default().await.unwrap(), State::Start);
    }

    #[tokio::test]
    async fn moves_forward_to_completed() {
        let dialogue = dialogue(2);

        advance(&dialogue, &State::Start, State::AwaitingUsername)
            .await
            .unwrap();
        assert_eq!(dialogue.get().await.unwrap(), Some(State::AwaitingUsername));

        let done = State::Completed {
            username: "alice".into(),
        };
        advance(&dialogue, &State::AwaitingUsername, done.clone())
            .await
            .unwrap();
        assert_eq!(dialogue.get().await.unwrap(), Some(done));
    }

    #[tokio::test]
    async fn completed_is_never_rolled_back() {
        let dialogue = dialogue(3);
        let done = State::Completed {
            username: "bob".into(),
        };
        dialogue.update(done.clone()).await.unwrap();

        advance(&dialogue, &done, State::AwaitingUsername)
            .await
            .unwrap();
        advance(&dialogue, &done, State::Start).await.unwrap();

        assert_eq!(dialogue.get().await.unwrap(), Some(done));
    }

    #[tokio::test]
    async fn users_are_independent() {
        let storage = InMemStorage::<State>::new();
        let first: LinkDialogue = Dialogue::new(storage.clone(), ChatId(10));
        let second: LinkDialogue = Dialogue::new(storage, ChatId(11));

        first.update(State::AwaitingUsername).await.unwrap();

        assert_eq!(second.get().await.unwrap(), None);
        assert_eq!(first.get().await.unwrap(), Some(State::AwaitingUsername));
    }
}
