use weather_records_core::{FeedState, RecordDetail};

pub fn print_detail(detail: &RecordDetail) {
    println!("{}", detail.heading);
    println!("{}", detail.date);
    println!("  Temperature: {}", detail.temperature);
    println!("  Conditions:  {}", detail.conditions);
    println!("  Humidity:    {}", detail.humidity);
    println!("  Wind:        {}", detail.wind);
    if let Some(notes) = &detail.notes {
        println!("  Notes:       {notes}");
    }
    println!("  Record ID: {}", detail.id);
}

pub fn print_feed(state: &FeedState) {
    match state {
        FeedState::Loading => println!("Loading..."),
        FeedState::Empty => println!("No submissions yet"),
        FeedState::Populated(_) => {
            for entry in state.entries() {
                println!("{} ({})", entry.heading, entry.date);
                if let Some(notes) = &entry.notes_excerpt {
                    println!("  Notes: {notes}");
                }
                println!("  ID: {}", entry.id);
            }
        }
    }
}
