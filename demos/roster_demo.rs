use clap::Parser;
use quad_probe::Miniature;
use quad_probe::ProbeSet;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "initial_capacity", default_value_t = 5)]
    initial_capacity: usize,
}

fn main() {
    let args = Args::parse();

    let mut roster: ProbeSet<Miniature> = ProbeSet::with_capacity(args.initial_capacity);

    roster.insert(Miniature::new(100, "Space Marine Captain", 2020));
    roster.insert(Miniature::new(50, "Imperial Guard", 2019));
    roster.insert(Miniature::new(75, "Ork Warboss", 2021));

    roster.print();

    match roster.get(&Miniature::new(100, "Space Marine Captain", 2020)) {
        Some(found) => println!("\nFound: {} (Cost: {})", found.name(), found.points_cost()),
        None => println!("\nNot found"),
    }

    if roster.remove(&Miniature::new(50, "Imperial Guard", 2019)).is_some() {
        println!("Removed Imperial Guard");
    } else {
        println!("Failed to remove Imperial Guard");
    }

    roster.print();
}
