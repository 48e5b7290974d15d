use std::{io::Write, path::PathBuf};

use anyhow::{Result, bail, anyhow};
use chj_util::{warn, warn::set_trace};
use clap::Parser as ClapParser;
use jxdom::{parse_html, Tree};
use kstring::KString;
use jx::{binding::{discover_bindings, select},
         config::Config,
         controller::{Controller, Outcome},
         registry::TemplateRegistry,
         util::read_file,
         value::Value};


#[derive(clap::Parser, Debug)]
/// Render JSON data into the templates of an HTML page, the way the
/// bindings declared in the page would when triggered.
struct Args {
    /// Action, one of "render" (template with data from --data),
    /// "bindings" (list them), "trigger" (the binding of --element,
    /// fetching from --root) or "cached" (template with data cached
    /// under --key).
    #[clap(required(true))]
    action: String,

    /// The HTML page holding the templates
    #[clap(long)]
    page: PathBuf,

    /// Template id
    #[clap(long)]
    template: Option<String>,

    /// JSON file to render with
    #[clap(long)]
    data: Option<PathBuf>,

    /// Print only the rendered template, not the whole page
    #[clap(long)]
    fragment: bool,

    /// Id of the element to trigger
    #[clap(long)]
    element: Option<String>,

    /// Cache key
    #[clap(long)]
    key: Option<String>,

    /// Directory that urls are resolved against (default: $JX_ROOT or .)
    #[clap(long)]
    root: Option<PathBuf>,

    /// Persistent cache directory (default: $JX_CACHE_DIR, or in-memory)
    #[clap(long)]
    cache_dir: Option<PathBuf>,

    /// Marker attribute prefix (default: $JX_PREFIX or "jx-")
    #[clap(long)]
    prefix: Option<String>,

    /// Print trace messages to stderr
    #[clap(long)]
    trace: bool,
}

fn need<'a, T: ?Sized>(val: Option<&'a T>, option: &str) -> Result<&'a T> {
    val.ok_or_else(|| anyhow!("need --{option} option"))
}

fn print_page(page: &Tree) -> Result<()> {
    let mut outp = std::io::stdout().lock();
    writeln!(&mut outp, "{}", page.to_html_string())?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if let Some(prefix) = &args.prefix {
        config.prefix = KString::from_ref(prefix);
    }
    config.trace |= args.trace;
    set_trace(config.trace);

    let markers = config.markers();
    let page = parse_html(&read_file(&args.page)?)?;

    match &*args.action {
        "render" => {
            let template = need(args.template.as_deref(), "template")?;
            let data = Value::from_json_str(&read_file(need(args.data.as_deref(), "data")?)?)?;
            if args.fragment {
                let registry = TemplateRegistry::from_page(&page, markers);
                let tree = registry.render(template, &data).ok_or_else(
                    || anyhow!("no template {template:?} in {:?} (have: {})",
                               args.page, registry.names().join(", ")))?;
                print_page(&tree)
            } else {
                let mut controller = Controller::new(page, markers,
                                                     config.fetcher(), config.cache());
                if controller.render_json(template, &data)? == Outcome::NoTemplate {
                    bail!("no template {template:?} in {:?}", args.page)
                }
                print_page(controller.page())
            }
        }
        "bindings" => {
            let mut outp = std::io::stdout().lock();
            for b in discover_bindings(&page, &markers) {
                let id = page.element(b.element)
                    .and_then(|e| e.get_attribute("id"))
                    .map_or("-", |v| v.as_str());
                let label = page.text_content(b.element);
                writeln!(&mut outp, "{id}\t{:?}\t{} {}\ttemplate={}\ttarget={}\tsave={}\ton={}",
                         label.trim(), b.method, b.url,
                         b.template.as_deref().unwrap_or("-"),
                         b.target.as_deref().unwrap_or("-"),
                         b.save.as_deref().unwrap_or("-"),
                         b.trigger)?;
            }
            Ok(())
        }
        "trigger" => {
            let element = need(args.element.as_deref(), "element")?;
            let id = select(&page, element).ok_or_else(
                || anyhow!("no element {element:?} in {:?}", args.page))?;
            let mut controller = Controller::new(page, markers,
                                                 config.fetcher(), config.cache());
            match controller.trigger(id)? {
                Outcome::Rendered { .. } => (),
                Outcome::Failed { template, message } =>
                    warn!("rendering {template:?} failed: {message}"),
                Outcome::NoTemplate =>
                    warn!("the binding of {element:?} names no known template"),
                Outcome::NoBinding =>
                    bail!("element {element:?} and its ancestors have no binding"),
            }
            print_page(controller.page())
        }
        "cached" => {
            let key = need(args.key.as_deref(), "key")?;
            let template = need(args.template.as_deref(), "template")?;
            let mut controller = Controller::new(page, markers,
                                                 config.fetcher(), config.cache());
            if !controller.load_cached(key, template)? {
                bail!("nothing cached under key {key:?}")
            }
            print_page(controller.page())
        }
        _ => bail!("unknown action {:?}", args.action)
    }
}
