use dioxus::prelude::*;
use staking_client::{InputField, Operation};

use super::stake::button_label;
use crate::state::{use_staking, SharedController};

#[component]
pub fn MintPage() -> Element {
    let staking = use_staking();
    let controller = use_context::<SharedController>();

    let state = staking.read().clone();
    let mint_label = button_label(state.pending, Operation::Mint, "Mint");

    let mint_input = controller.clone();
    let on_mint = move |_| {
        let controller = controller.clone();
        spawn(async move {
            if let Ok(amount) = controller.amount_from_input(InputField::Mint) {
                let _ = controller.mint(amount).await;
            }
        });
    };

    rsx! {
        div { class: "page",
            h1 { "Mint" }
            p { class: "subtitle", "Mint new tokens to the connected account." }

            if let Some(account) = state.session.account {
                p { class: "label", "Recipient: " span { class: "mono", "{account:?}" } }

                div { class: "form-group",
                    label { "Amount" }
                    input {
                        class: "input",
                        r#type: "text",
                        value: "{state.inputs.mint}",
                        oninput: move |e| mint_input.set_input(InputField::Mint, e.value()),
                    }
                }

                button {
                    class: "btn btn-primary",
                    disabled: state.is_loading(),
                    onclick: on_mint,
                    "{mint_label}"
                }
            } else {
                p { class: "hint", "Connect your wallet first." }
            }
        }
    }
}
