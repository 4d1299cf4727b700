use leptos::*;

use crate::{
    app::AppCtx,
    domain::{
        logging::LogComponent,
        portfolio::{Portfolio, PortfolioRequest},
    },
    log_debug,
};

/// 💼 Holdings priced at the moment they were added
#[component]
pub fn PortfolioView(ctx: AppCtx) -> impl IntoView {
    let service = ctx.portfolio_service.clone();
    let portfolio = ctx.portfolio;

    // Pricing failures are logged by the service and leave the table unchanged.
    let on_add = Callback::new(move |request: PortfolioRequest| {
        let service = service.clone();
        spawn_local(async move {
            service.add(request, |entry| portfolio.update(|p| p.add(entry))).await;
        });
    });

    view! {
        <section class="portfolio">
            <h1>"Portfolio"</h1>
            <PortfolioForm on_add=on_add />
            <PortfolioTable portfolio=portfolio />
        </section>
    }
}

#[component]
fn PortfolioForm(on_add: Callback<PortfolioRequest>) -> impl IntoView {
    let (name, set_name) = create_signal(String::new());
    let (quantity, set_quantity) = create_signal(String::from("1"));
    let (invalid, set_invalid) = create_signal(None::<String>);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        match PortfolioRequest::parse(&name.get_untracked(), &quantity.get_untracked()) {
            Ok(request) => {
                set_invalid.set(None);
                set_name.set(String::new());
                on_add.call(request);
            }
            Err(err) => set_invalid.set(Some(err.to_string())),
        }
    };

    view! {
        <form class="portfolio-form" on:submit=submit>
            <input
                type="text"
                placeholder="Stock symbol"
                prop:value=name
                on:input=move |ev| set_name.set(event_target_value(&ev))
            />
            <input
                type="number"
                min="1"
                step="1"
                prop:value=quantity
                on:input=move |ev| set_quantity.set(event_target_value(&ev))
            />
            <button type="submit">"Add"</button>
            {move || invalid.get().map(|message| view! { <div class="form-error">{message}</div> })}
        </form>
    }
}

#[component]
fn PortfolioTable(portfolio: RwSignal<Portfolio>) -> impl IntoView {
    let rows = move || {
        portfolio.with(|p| {
            p.entries()
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let name = entry.stock_name.to_string();
                    let (quantity, price, value) = (entry.quantity, entry.price, entry.value());
                    view! {
                        <tr>
                            <td>{name}</td>
                            <td>{quantity}</td>
                            <td>{format!("{price:.2}")}</td>
                            <td>{format!("{value:.2}")}</td>
                            <td>
                                <button on:click=move |_| {
                                    portfolio.update(|p| {
                                        p.remove(index);
                                    });
                                    log_debug!(LogComponent::Presentation("Portfolio"), "Removed row {}", index);
                                }>"Remove"</button>
                            </td>
                        </tr>
                    }
                })
                .collect_view()
        })
    };

    view! {
        <table class="portfolio-table">
            <thead>
                <tr>
                    <th>"Stock"</th>
                    <th>"Quantity"</th>
                    <th>"Price"</th>
                    <th>"Value"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
            <tfoot>
                <tr>
                    <td colspan="3">"Total"</td>
                    <td>{move || format!("{:.2}", portfolio.with(Portfolio::total_value))}</td>
                    <td></td>
                </tr>
            </tfoot>
        </table>
    }
}
