use cleave::slice::{DataType, DefaultExporter, Kernel, SliceConfig, Statement, TimeUnit};
use cleave::{GeneticConfig, Polarization, PolarizationConfig, QualityFunction};
use chrono::{Duration, NaiveDate};
use rand::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A simulated debate over twelve weeks. Eight organizations speak about
    // three concepts; halfway through, two of them switch sides.
    //
    // Weeks 1-6:  {Greens, Solar Assn, Farmers, Unions}  vs  {Coal Lobby, Utilities, Chamber, Miners}
    // Weeks 7-12: Farmers and Unions move to the other camp.
    let orgs = [
        "Greens",
        "Solar Assn",
        "Farmers",
        "Unions",
        "Coal Lobby",
        "Utilities",
        "Chamber",
        "Miners",
    ];
    let concepts = ["carbon tax", "wind power", "coal exit"];
    let origin = NaiveDate::from_ymd_opt(2021, 1, 4)
        .ok_or("bad date")?
        .and_hms_opt(9, 0, 0)
        .ok_or("bad time")?;

    let mut rng = StdRng::seed_from_u64(7);
    let mut statements = Vec::new();
    for day in 0..84i64 {
        for _ in 0..3 {
            let who = rng.random_range(0..orgs.len());
            let concept = concepts[rng.random_range(0..concepts.len())];
            let switched = day >= 42 && (who == 2 || who == 3);
            let pro = (who < 4) != switched;
            // A little noise: one statement in ten goes against the camp line.
            let agree = if rng.random_bool(0.1) { !pro } else { pro };
            statements.push(
                Statement::new(statements.len() as u64, origin + Duration::days(day), "DNA Statement")
                    .with_value("organization", orgs[who])
                    .with_value("concept", concept)
                    .with_value("agreement", agree),
            );
        }
    }

    let exporter = DefaultExporter::builder(statements)
        .with_data_type("agreement", DataType::Boolean)
        .build();

    let config = PolarizationConfig {
        slices: SliceConfig::new()
            .with_window(TimeUnit::Weeks, 4)
            .with_kernel(Kernel::Epanechnikov)
            .with_indent(true)
            .with_normalize(true),
        genetic: GeneticConfig::new()
            .with_num_parents(40)
            .with_num_iterations(300)
            .with_mutation_percentage(0.25)
            .with_quality(QualityFunction::AbsDiff)
            .with_seed(12345),
    };

    let series = Polarization::new(config).run(&exporter)?;

    println!("slices={}", series.len());
    for r in &series {
        let mut camps: Vec<Vec<&str>> = vec![Vec::new(); 2];
        for (name, &m) in r.names().iter().zip(r.memberships()) {
            if let Some(camp) = camps.get_mut(m) {
                camp.push(name);
            }
        }
        println!(
            "{}  q={:.3}  generations={:>3}{}  {:?} | {:?}",
            r.middle().date(),
            r.final_max_q(),
            r.generations(),
            if r.early_convergence() { "*" } else { " " },
            camps[0],
            camps[1],
        );
    }

    // Adjusted Rand index between consecutive slices: the dip marks the
    // realignment.
    let stability = series.membership_stability();
    println!("stability={:.2?}", stability);

    Ok(())
}
