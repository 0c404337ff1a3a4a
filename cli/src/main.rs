use clap::Parser;
use colored::*;
use std::io::Write;
use std::process;
use std::sync::Arc;
use tokio::sync::mpsc;

use traversa_core::{
    build_targets, default_payloads, load_indicators, load_payloads, parse_custom_headers,
    DetectionRules, Detector, HttpClient, ProbeEngine, ProbeResult, ResultAggregator,
};

#[derive(Parser, Debug)]
#[command(
    name = "TRAVERSA",
    version,
    about = "Concurrent LFI probe with payload-encoding mutation",
    override_usage = "traversa <url> <options>",
    after_help = "\x1b[1;36mEXAMPLES:\x1b[0m
  Quick scan:            traversa \"http://target.com/page.php?file=index\"
  Custom payloads:       traversa \"http://target.com/page.php?file=index\" -p payloads_lfi.txt
  Pick the parameter:    traversa \"http://target.com/view.php?id=1&file=x\" -P file
  No query string:       traversa http://target.com/index.php   (tries common parameter names)
  Save results:          traversa \"http://target.com/page.php?file=x\" -o results.tsv
  Through Burp:          traversa \"http://target.com/page.php?file=x\" --proxy http://127.0.0.1:8080
  Slow target:           traversa \"http://target.com/page.php?file=x\" -T 5 --timeout 20"
)]
pub struct Args {
    /// Target URL with an injectable parameter (e.g. http://example.com/page.php?file=index)
    pub url: String,

    #[arg(short = 'p', long, help = "File with LFI payloads (one per line, # for comments)")]
    pub payloads: Option<String>,

    #[arg(
        short = 'P',
        long,
        help = "Query parameter to inject into (default: first existing parameter)"
    )]
    pub param: Option<String>,

    #[arg(short = 'T', long, default_value_t = 10, help = "Number of concurrent requests")]
    pub threads: usize,

    #[arg(long, default_value_t = 10, help = "HTTP request timeout in seconds")]
    pub timeout: u64,

    #[arg(
        short = 'o',
        long,
        help = "Save results to a file (TSV, or JSON lines with --json)"
    )]
    pub output: Option<String>,

    #[arg(long, default_value_t = false, help = "Write results as JSON lines instead of TSV")]
    pub json: bool,

    #[arg(long, help = "Proxy URL (e.g. http://127.0.0.1:8080)")]
    pub proxy: Option<String>,

    #[arg(
        short = 'H',
        long = "header",
        help = "Custom header (e.g. \"Cookie: sess=abc\")"
    )]
    pub headers: Vec<String>,

    #[arg(long, help = "File overriding the built-in LFI body indicators")]
    pub lfi_indicators: Option<String>,

    #[arg(long, help = "File overriding the built-in WAF indicators")]
    pub waf_indicators: Option<String>,

    #[arg(
        short = 'v',
        long,
        default_value_t = false,
        help = "Print a line for every probe (Verbose Mode)"
    )]
    pub verbose: bool,

    #[arg(long, help = "Generate targets without sending any requests")]
    pub dry_run: bool,
}

#[tokio::main]
async fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    env_logger::init();

    let args = Args::parse();

    print_banner();

    let payloads = match &args.payloads {
        Some(path) => match load_payloads(path) {
            Ok(list) if !list.is_empty() => {
                print!(
                    "{}\r\n",
                    format!("[+] Loaded {} payload(s) from {}", list.len(), path)
                        .green()
                        .bold()
                );
                std::io::stdout().flush().ok();
                list
            }
            Ok(_) => fatal(&format!("Payload file '{}' contains no payloads.", path)),
            Err(e) => fatal(&e.to_string()),
        },
        None => {
            let list = default_payloads();
            print!(
                "{}\r\n",
                format!("[*] No payload file given, using {} built-in payload(s).", list.len())
                    .bright_cyan()
            );
            std::io::stdout().flush().ok();
            list
        }
    };

    let mut rules = DetectionRules::default();
    if let Some(path) = &args.lfi_indicators {
        rules.lfi_indicators = load_indicator_list(path);
    }
    if let Some(path) = &args.waf_indicators {
        rules.waf_indicators = load_indicator_list(path);
    }

    let targets = match build_targets(&args.url, args.param.as_deref(), &payloads, &rules) {
        Ok(targets) => targets,
        Err(e) => fatal(&e.to_string()),
    };

    print_scan_config(&args, payloads.len(), targets.len());

    if args.dry_run {
        println!(
            "[DRY RUN] Would send {} request(s) to {}",
            targets.len(),
            args.url
        );
        return;
    }

    let custom_headers = parse_custom_headers(&args.headers);
    let client = Arc::new(HttpClient::new(
        args.timeout,
        args.proxy.as_deref(),
        &custom_headers,
    ));
    let detector = Arc::new(Detector::new(rules));

    let engine = ProbeEngine::new(client, detector, args.threads);

    let cancel = engine.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print!(
                "{}\r\n",
                "[!] Interrupt received, finishing in-flight requests...".yellow()
            );
            std::io::stdout().flush().ok();
            cancel.cancel();
        }
    });

    let total = targets.len();
    let (result_tx, result_rx) = mpsc::channel::<ProbeResult>(100);

    let (_, results) = tokio::join!(
        engine.run(targets, result_tx),
        ResultAggregator::run(result_rx, total, args.verbose)
    );

    let records = ResultAggregator::to_records(&results);
    ResultAggregator::print_table(&records);
    ResultAggregator::print_summary(&results);

    if let Some(path) = &args.output {
        let written = if args.json {
            ResultAggregator::write_jsonl(path, &results)
        } else {
            ResultAggregator::write_tsv(path, &records)
        };
        match written {
            Ok(()) => {
                print!(
                    "{}\r\n",
                    format!("[+] Results saved to {}", path).green().bold()
                );
                std::io::stdout().flush().ok();
            }
            Err(e) => fatal(&format!("{:#}", e)),
        }
    }
}

/// Prints a fatal error and exits. Fatal errors always abort before probing
/// starts; per-request failures never reach this path.
fn fatal(message: &str) -> ! {
    eprint!("{}\r\n", format!("[!] {}", message).red());
    std::io::stderr().flush().ok();
    process::exit(1);
}

fn load_indicator_list(path: &str) -> Vec<String> {
    match load_indicators(path) {
        Ok(list) if !list.is_empty() => list,
        Ok(_) => fatal(&format!("Indicator file '{}' contains no entries.", path)),
        Err(e) => fatal(&e.to_string()),
    }
}

/// Prints the TRAVERSA ASCII banner.
fn print_banner() {
    let banner = r#"
  ______
 /_  __/________ __   _____  ______________ _
  / / / ___/ __ `/ | / / _ \/ ___/ ___/ __ `/
 / / / /  / /_/ /| |/ /  __/ /  (__  ) /_/ /
/_/ /_/   \__,_/ |___/\___/_/  /____/\__,_/
"#;
    print!("{}\r\n", banner.bright_cyan().bold());
    print!("{}\r\n", "──────────────────────────────────────────────────".dimmed());
    std::io::stdout().flush().ok();
}

/// Prints the scan configuration summary.
fn print_scan_config(args: &Args, payload_count: usize, target_count: usize) {
    print!("{}\r\n", format!("[+] Target:     {}", args.url).green().bold());
    if let Some(ref param) = args.param {
        print!("{}\r\n", format!("[+] Parameter:  {}", param).blue());
    }
    print!("{}\r\n", format!("[+] Payloads:   {}", payload_count).blue());
    print!("{}\r\n", format!("[+] Requests:   {}", target_count).blue());
    print!("{}\r\n", format!("[+] Threads:    {}", args.threads).blue());
    print!("{}\r\n", format!("[+] Timeout:    {}s", args.timeout).blue());
    if let Some(ref output) = args.output {
        let format_label = if args.json { "JSON lines" } else { "TSV" };
        print!(
            "{}\r\n",
            format!("[+] Output:     {} ({})", output, format_label).blue()
        );
    }
    if let Some(ref proxy) = args.proxy {
        print!("{}\r\n", format!("[+] Proxy:      {}", proxy).yellow());
    }
    if !args.headers.is_empty() {
        print!(
            "{}\r\n",
            format!("[+] Headers:    {} custom", args.headers.len()).yellow()
        );
    }
    print!("{}\r\n", "──────────────────────────────────────────────────".dimmed());
    std::io::stdout().flush().ok();
}
