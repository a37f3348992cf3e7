//! Interactive session: one process hosting the submit form, the lookup panel
//! and a feed that stays mounted until the user quits.

use std::fmt;

use inquire::{Select, Text};
use weather_records_core::{
    LookupClient, LookupPanel, LookupStatus, RecordDetail, SubmissionForm, SubmitClient,
    WeatherApp,
};

use crate::{output, prompt::prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Submit,
    Lookup,
    Feed,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 4] = [Self::Submit, Self::Lookup, Self::Feed, Self::Quit];
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Submit => "Submit an observation",
            Self::Lookup => "Look up a record",
            Self::Feed => "Show submissions",
            Self::Quit => "Quit",
        })
    }
}

pub async fn run(app: WeatherApp) -> anyhow::Result<()> {
    let feed = app.mount_feed();
    let lookup = app.lookup_client();
    let submit = app.submit_client();
    let mut panel = LookupPanel::new();

    loop {
        let choice = prompt(|| Select::new("What next?", MenuItem::ALL.to_vec()).prompt()).await?;

        match choice {
            Some(MenuItem::Submit) => submit_observation(&submit).await?,
            Some(MenuItem::Lookup) => look_up(&mut panel, &lookup).await?,
            Some(MenuItem::Feed) => output::print_feed(&feed.snapshot().state),
            Some(MenuItem::Quit) | None => break,
        }
    }

    feed.unmount().await;
    Ok(())
}

async fn submit_observation(client: &SubmitClient) -> anyhow::Result<()> {
    let Some(location) = prompt(|| Text::new("Location:").prompt()).await? else {
        return Ok(());
    };

    let form = SubmissionForm::new(location);
    let today = form.date.clone();
    let Some(date) = prompt(move || Text::new("Date:").with_default(&today).prompt()).await? else {
        return Ok(());
    };
    let Some(notes) = prompt(|| Text::new("Notes (optional):").prompt()).await? else {
        return Ok(());
    };

    match client.submit(&form.with_date(date).with_notes(notes)).await {
        Ok(receipt) => println!("Submitted. Record ID: {}", receipt.id),
        Err(err) => println!("{}", err.user_message()),
    }
    Ok(())
}

async fn look_up(panel: &mut LookupPanel, client: &LookupClient) -> anyhow::Result<()> {
    let previous = panel.input().to_string();
    let Some(input) =
        prompt(move || Text::new("Weather ID:").with_initial_value(&previous).prompt()).await?
    else {
        return Ok(());
    };

    // The prompt returns when Enter is pressed.
    panel.set_input(input);
    panel.key_pressed("Enter", client).await;

    match panel.status() {
        LookupStatus::Failed => {
            if let Some(err) = panel.error() {
                println!("{}", err.user_message());
            }
        }
        LookupStatus::Success => {
            if let Some(record) = panel.record() {
                output::print_detail(&RecordDetail::from(record));
            }
        }
        LookupStatus::Idle | LookupStatus::InFlight => {}
    }
    Ok(())
}
