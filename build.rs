use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
};

// Must stay in step with the IR types in src/routines/mod.rs.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default)]
struct IRCommand {
    forward: f64,
    rotation: f64,
    heading: Option<f64>,
    top: f64,
    bottom: f64,
    solenoid: bool,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
enum IRTrigger {
    Timed(u64),
    Until(String),
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
struct IRPhase {
    name: String,
    trigger: IRTrigger,
    command: IRCommand,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRClock {
    Scheduled,
    Restart,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
struct IRRoutine {
    name: String,
    clock: IRClock,
    phases: Vec<IRPhase>,
}

fn parse_number(s: &str, line: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("invalid number '{s}' in: {line}"))
}
fn parse_bool(s: &str, line: &str) -> bool {
    match s.trim() {
        "true" | "on" => true,
        "false" | "off" => false,
        _ => panic!("invalid bool '{s}' in: {line}"),
    }
}

fn parse_attrs(rest: &str, line: &str) -> IRCommand {
    let mut command = IRCommand::default();
    for attr in rest.split_whitespace() {
        let (key, value) = attr
            .split_once('=')
            .unwrap_or_else(|| panic!("expected key=value, got '{attr}' in: {line}"));
        match key {
            "forward" => command.forward = parse_number(value, line),
            "rotation" => command.rotation = parse_number(value, line),
            "heading" => command.heading = Some(parse_number(value, line)),
            "top" => command.top = parse_number(value, line),
            "bottom" => command.bottom = parse_number(value, line),
            "shooter" => {
                let power = parse_number(value, line);
                command.top = power;
                command.bottom = power;
            }
            "solenoid" => command.solenoid = parse_bool(value, line),
            _ => panic!("unknown attribute '{key}' in: {line}"),
        }
    }
    command
}

// phase "name" for <ms> [attrs]
// phase "name" until <condition> [attrs]
fn parse_phase(line: &str) -> IRPhase {
    let after = line.trim_start_matches("phase").trim();
    let after = after
        .strip_prefix('"')
        .unwrap_or_else(|| panic!("phase name must be quoted: {line}"));
    let (name, rest) = after
        .split_once('"')
        .unwrap_or_else(|| panic!("unterminated phase name: {line}"));
    let mut parts = rest.trim().splitn(3, ' ');
    let kind = parts.next().unwrap_or("");
    let arg = parts.next().unwrap_or("").trim();
    let attrs = parts.next().unwrap_or("");
    let trigger = match kind {
        "for" => IRTrigger::Timed(
            arg.parse()
                .unwrap_or_else(|_| panic!("milliseconds expected: {line}")),
        ),
        "until" if !arg.is_empty() => IRTrigger::Until(arg.to_string()),
        _ => panic!("expected 'for <ms>' or 'until <condition>': {line}"),
    };
    IRPhase {
        name: name.to_string(),
        trigger,
        command: parse_attrs(attrs, line),
    }
}

fn parse_routine(name: &str, content: &str) -> IRRoutine {
    let mut clock = IRClock::Scheduled;
    let mut phases = Vec::new();
    for line in content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
    {
        if let Some(kind) = line.strip_prefix("clock") {
            clock = match kind.trim() {
                "scheduled" => IRClock::Scheduled,
                "restart" => IRClock::Restart,
                other => panic!("unknown clock '{other}' in routine {name}"),
            };
        } else if line.starts_with("phase") {
            phases.push(parse_phase(line));
        } else {
            panic!("unrecognised line in routine {name}: {line}");
        }
    }
    IRRoutine {
        name: name.to_string(),
        clock,
        phases,
    }
}

fn find_routine_files(dir: &Path) -> Vec<PathBuf> {
    let mut res = Vec::new();
    if let Ok(read) = fs::read_dir(dir) {
        for e in read.flatten() {
            let p = e.path();
            if p.extension().and_then(|s| s.to_str()) != Some("routine") {
                continue;
            }
            // skip editor and macOS metadata files
            let hidden = p
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if !hidden {
                res.push(p);
            }
        }
    }
    res.sort();
    res
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let routines_dir = Path::new("src/routines");
    println!("cargo:rerun-if-changed=src/routines");

    let files = find_routine_files(routines_dir);
    let mut index_src = String::from("pub static ROUTINE_BLOBS: &[(&str, &[u8])] = &[\n");
    for file in files {
        let name = file.file_stem().unwrap().to_string_lossy().to_string();
        println!("cargo:rerun-if-changed={}", file.display());
        let content = fs::read_to_string(&file).expect("read .routine");
        let routine = parse_routine(&name, &content);
        let bytes = postcard::to_allocvec(&routine).expect("serialize routine");
        let out_file = out_dir.join(format!("routine_{name}.bin"));
        fs::write(&out_file, &bytes).expect("write bin");
        index_src.push_str(&format!(
            "    (\"{}\", include_bytes!(concat!(env!(\"OUT_DIR\"), \"/{}\")) as &[u8]),\n",
            name,
            out_file.file_name().unwrap().to_string_lossy()
        ));
    }
    index_src.push_str("];");
    let mut f = fs::File::create(out_dir.join("routines_index.rs")).expect("create index");
    f.write_all(index_src.as_bytes()).unwrap();
}
