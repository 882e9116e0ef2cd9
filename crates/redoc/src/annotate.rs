//! Turn ReFrame's generated scripts into readable run instructions
//!
//! The job and build scripts carry framework boilerplate (shebang, an error
//! trap, the MPI launcher line). We strip that, drop repeated `module load`
//! lines and group what is left under short section comments.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

const SHEBANG: &str = "#!/bin/bash";

/// Error trap ReFrame writes at the top of every script
const ONERROR_BLOCK: &str = r#"_onerror()
{
    exitcode=$?
    echo "-reframe: command \`$BASH_COMMAND' failed (exit code: $exitcode)"
    exit $exitcode
}

trap _onerror ERR"#;

/// Commands that start a compile step
const COMPILERS: &[&str] = &[
    "mpiicpc", "cc", "gcc", "icc", "icpc", "javac", "gfortran", "ifort", "nagfor", "mpicc",
    "mpiifort",
];

static LAUNCHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^mpi[re][ux][ne]c?[^;\n]*[ml][ls];?$").expect("valid regex"));
static LAUNCHER_INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^mpi[re][ux][ne]c?[^;\n]*[ml][ls];.+$").expect("valid regex"));
static MODULE_LOAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^module load \S+$").expect("valid regex"));
static ATTRIBUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#+\s*[Aa]ttribution: (.*)$").expect("valid regex"));

/// Section a kept line is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Compile,
    Remove,
    Display,
    Run,
}

impl Section {
    pub fn header(&self) -> &'static str {
        match self {
            Self::Compile => "# Compile source code",
            Self::Remove => "# Remove files created",
            Self::Display => "# Display results",
            Self::Run => "# Run exercise",
        }
    }
}

/// What to do with one script line
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind<'a> {
    Launcher,
    ModuleLoad,
    Attribution(&'a str),
    Command(Section),
}

/// Annotated script plus the attribution pulled out of it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotated {
    pub run_commands: String,
    pub attribution: String,
}

fn starts_with_compiler(line: &str) -> bool {
    COMPILERS.iter().any(|compiler| {
        line.strip_prefix(compiler)
            .and_then(|rest| rest.strip_prefix(' '))
            .is_some_and(|args| !args.is_empty())
    })
}

fn classify(line: &str) -> LineKind<'_> {
    if LAUNCHER.is_match(line) {
        LineKind::Launcher
    } else if MODULE_LOAD.is_match(line) {
        LineKind::ModuleLoad
    } else if starts_with_compiler(line) {
        LineKind::Command(Section::Compile)
    } else if line.starts_with("rm") {
        LineKind::Command(Section::Remove)
    } else if line.starts_with("cat") {
        LineKind::Command(Section::Display)
    } else if let Some(caps) = ATTRIBUTION.captures(line) {
        LineKind::Attribution(caps.get(1).map_or("", |m| m.as_str()))
    } else {
        LineKind::Command(Section::Run)
    }
}

/// Undo the launcher prefix and the one-space indent ReFrame adds
fn clean_line(line: &str) -> &str {
    let line = if LAUNCHER_INLINE.is_match(line) {
        line.split_once(';').map_or(line, |(_, rest)| rest)
    } else {
        line
    };

    if line.starts_with(' ') && !line.starts_with("  ") {
        &line[1..]
    } else {
        line
    }
}

/// Annotate the combined build+job script of a test of `module`
pub fn annotate(script: &str, module: &str) -> Annotated {
    let script = script.replace(SHEBANG, "").replace(ONERROR_BLOCK, "");

    let mut out: Vec<String> = Vec::new();
    let mut module_loads: HashSet<String> = HashSet::new();
    let mut headed: HashSet<Section> = HashSet::new();
    let mut attribution = String::new();

    for raw in script.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = clean_line(raw);

        match classify(line) {
            LineKind::Launcher => {}
            LineKind::ModuleLoad => {
                if module_loads.is_empty() {
                    out.push(format!("# Load {} and other necessary modules", module));
                }
                if module_loads.insert(line.to_string()) {
                    out.push(line.to_string());
                }
            }
            LineKind::Attribution(text) => attribution = text.to_string(),
            LineKind::Command(section) => {
                if headed.insert(section) {
                    out.push(format!("\n{}", section.header()));
                }
                out.push(line.to_string());
            }
        }
    }

    collapse_run_headers(&mut out);

    Annotated {
        run_commands: out.join("\n"),
        attribution,
    }
}

/// Keep only the last `# Run exercise` header if several ended up in `lines`
fn collapse_run_headers(lines: &mut Vec<String>) {
    let header = format!("\n{}", Section::Run.header());
    let Some(last) = lines.iter().rposition(|l| *l == header) else {
        return;
    };

    let mut index = 0;
    lines.retain(|l| {
        let keep = *l != header || index == last;
        index += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_strips_boilerplate() {
        let script = format!("{}\n{}\n./hello\n", SHEBANG, ONERROR_BLOCK);
        let annotated = annotate(&script, "gcc");

        assert_eq!(annotated.run_commands, "\n# Run exercise\n./hello");
        assert!(!annotated.run_commands.contains("_onerror"));
    }

    #[test]
    fn test_module_load_deduplicated() {
        let script = "module load gcc/12\nmodule load gcc/12\nmodule load openmpi\n";
        let annotated = annotate(script, "gcc");

        assert_eq!(
            annotated.run_commands,
            "# Load gcc and other necessary modules\nmodule load gcc/12\nmodule load openmpi"
        );
        assert_eq!(count(&annotated.run_commands, "# Load gcc"), 1);
    }

    #[test]
    fn test_compile_header_once() {
        let script = "gcc -c a.c\ngcc -c b.c\ngcc a.o b.o -o prog\n";
        let annotated = annotate(script, "gcc");

        assert_eq!(
            annotated.run_commands,
            "\n# Compile source code\ngcc -c a.c\ngcc -c b.c\ngcc a.o b.o -o prog"
        );
    }

    #[test]
    fn test_compiler_needs_arguments() {
        assert!(starts_with_compiler("gfortran -O2 solver.f90"));
        assert!(!starts_with_compiler("gcc"));
        assert!(!starts_with_compiler("gcc "));
        assert!(!starts_with_compiler("gccx foo"));
    }

    #[test]
    fn test_attribution_extracted() {
        let script = "# Attribution: Jane Doe\n./hello\n";
        let annotated = annotate(script, "hello");

        assert_eq!(annotated.attribution, "Jane Doe");
        assert!(!annotated.run_commands.contains("Attribution"));
        assert!(!annotated.run_commands.contains("Jane Doe"));
    }

    #[test]
    fn test_attribution_variants() {
        assert_eq!(annotate("  ## attribution: HPC Carpentry", "m").attribution, "HPC Carpentry");
        assert_eq!(annotate("./run", "m").attribution, "");
    }

    #[test]
    fn test_launcher_lines() {
        let script = "mpirun -np 4 --mca btl self,sm,tcp all\nmpiexec -n 2 -ppn all; ./hello 3\n";
        let annotated = annotate(script, "mpi");

        assert_eq!(annotated.run_commands, "\n# Run exercise\n./hello 3");
    }

    #[test]
    fn test_single_space_indent_removed() {
        let script = " ./one\n  ./two\n";
        let annotated = annotate(script, "m");

        assert_eq!(annotated.run_commands, "\n# Run exercise\n./one\n  ./two");
    }

    #[test]
    fn test_sections_keep_order() {
        let script = "\
#!/bin/bash
module load python
python3 setup.py
gcc -o prog prog.c
./prog > out.txt
cat out.txt
rm out.txt
./prog again
";
        let annotated = annotate(script, "python");

        assert_eq!(
            annotated.run_commands,
            "# Load python and other necessary modules\n\
             module load python\n\
             \n# Run exercise\n\
             python3 setup.py\n\
             \n# Compile source code\n\
             gcc -o prog prog.c\n\
             ./prog > out.txt\n\
             \n# Display results\n\
             cat out.txt\n\
             \n# Remove files created\n\
             rm out.txt\n\
             ./prog again"
        );
        assert_eq!(count(&annotated.run_commands, "# Run exercise"), 1);
    }

    #[test]
    fn test_collapse_run_headers_keeps_last() {
        let header = "\n# Run exercise".to_string();
        let mut lines = vec![
            header.clone(),
            "./a".to_string(),
            header.clone(),
            "./b".to_string(),
        ];
        collapse_run_headers(&mut lines);

        assert_eq!(lines, vec!["./a".to_string(), header, "./b".to_string()]);
    }

    #[test]
    fn test_empty_script() {
        assert_eq!(annotate("\n\n   \n", "m"), Annotated::default());
    }
}
