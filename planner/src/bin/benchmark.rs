use std::fs::read_dir;
use std::path::{Path, PathBuf};

#[cfg(not(all(feature = "prof", feature = "highs")))]
pub fn main() {
    println!("benchmarks not supported -- enable 'prof' and 'highs' crate features")
}

struct BenchResult {
    name: String,
    nodes: usize,
    eligible: usize,
    outcome: Outcome,
}

enum Outcome {
    Planned {
        time: f64,
        trucks: usize,
        uav_nodes: usize,
        obj: f64,
        bound: f64,
        status: String,
    },
    Failed {
        time: f64,
        error: String,
    },
}

fn get_instance_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut filenames = Vec::new();
    for entry in read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "json") {
            filenames.push(path);
        }
    }
    filenames.sort();
    Ok(filenames)
}

#[cfg(all(feature = "prof", feature = "highs"))]
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    use dronevrp_planner::{solve_highs, verify::verify};
    use dronevrp_structs::problem::{Problem, SolverParams};
    use log::warn;
    use std::{fs::read_to_string, io::Write, time::Instant};

    env_logger::init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("instances"));
    let params = match std::env::args().nth(2) {
        Some(file) => serde_json::from_str::<SolverParams>(&read_to_string(file)?)?,
        None => SolverParams::default(),
    };

    println!("----------------------------");
    println!("dronevrp planner benchmarking");
    println!("----------------------------");
    println!();
    println!(
        "  time limit {}s, gap {}",
        params.time_limit_seconds, params.optimality_gap
    );
    println!();

    let instance_files = get_instance_files(&dir)?;
    let mut results: Vec<BenchResult> = Vec::new();

    println!("# RUNNING {} INSTANCES", instance_files.len());
    for filename in instance_files.iter() {
        let _p = hprof::enter("instance");
        let problem: Problem = {
            let _p = hprof::enter("read");
            serde_json::from_str(&read_to_string(filename)?)?
        };
        println!(
            " * instance {} with {} nodes, {} UAV-eligible",
            filename.display(),
            problem.node_count,
            problem.uav_eligible.len()
        );

        let t0 = Instant::now();
        let result = solve_highs(&problem, &params);
        let time = t0.elapsed().as_secs_f64();
        let outcome = match result {
            Ok(plan) => {
                for violation in verify(&problem, &plan) {
                    warn!("{}: {}", filename.display(), violation);
                }
                Outcome::Planned {
                    time,
                    trucks: plan.num_trucks(),
                    uav_nodes: plan.uav_sorties.len(),
                    obj: plan.objective,
                    bound: plan.bound,
                    status: format!("{:?}", plan.status),
                }
            }
            Err(e) => Outcome::Failed {
                time,
                error: e.to_string(),
            },
        };

        results.push(BenchResult {
            name: filename
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            nodes: problem.node_count,
            eligible: problem.uav_eligible.len(),
            outcome,
        });
    }
    println!();
    println!("# PROFILER");
    hprof::profiler().print_timing();
    println!();

    println!("# RESULTS");

    let mut tablewriter = tabwriter::TabWriter::new(Vec::new());
    writeln!(
        &mut tablewriter,
        "instance\tnodes\telig\t|\ttrucks\tuav\ttime\tobj\tbnd\tstatus"
    )?;
    writeln!(&mut tablewriter, "---\t---\t---\t\t---\t---\t---\t---\t---\t---")?;
    for r in results.iter() {
        write!(&mut tablewriter, "{}\t{}\t{}\t|", r.name, r.nodes, r.eligible)?;
        match &r.outcome {
            Outcome::Planned {
                time,
                trucks,
                uav_nodes,
                obj,
                bound,
                status,
            } => writeln!(
                &mut tablewriter,
                "\t{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{}",
                trucks, uav_nodes, time, obj, bound, status
            )?,
            Outcome::Failed { time, error } => writeln!(
                &mut tablewriter,
                "\t-\t-\t{:.2}\t-\t-\t{}",
                time, error
            )?,
        }
    }

    let table = match tablewriter.into_inner() {
        Ok(table) => table,
        Err(_) => return Err("could not flush result table".into()),
    };
    let written = String::from_utf8(table)?;
    println!("{}", written);
    Ok(())
}
