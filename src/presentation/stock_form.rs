use leptos::*;

use crate::domain::market_data::Symbol;

/// Symbol entry. Blank input is rejected here and never starts a run.
#[component]
pub fn StockInputForm(on_submit: Callback<Symbol>) -> impl IntoView {
    let (value, set_value) = create_signal(String::new());
    let (invalid, set_invalid) = create_signal(None::<String>);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        match Symbol::new(&value.get_untracked()) {
            Ok(symbol) => {
                set_invalid.set(None);
                on_submit.call(symbol);
            }
            Err(err) => set_invalid.set(Some(err.to_string())),
        }
    };

    view! {
        <form class="stock-form" on:submit=submit>
            <label for="stock-name">"Stock symbol"</label>
            <input
                id="stock-name"
                type="text"
                placeholder="e.g. AAPL"
                prop:value=value
                on:input=move |ev| set_value.set(event_target_value(&ev))
            />
            <button type="submit">"Predict"</button>
            {move || invalid.get().map(|message| view! { <div class="form-error">{message}</div> })}
        </form>
    }
}
