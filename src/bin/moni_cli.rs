use std::{env, error::Error, fs, path::PathBuf, process};

use chrono::NaiveDate;

use colored::Colorize;

use moni_core::{
    advisor::build_prompt,
    config::{Config, ConfigManager},
    core::{
        clock::{Clock, FixedClock, SystemClock},
        store::{ClearConfirmation, DataStore, LoadOutcome},
        utils::PathResolver,
    },
    currency::CurrencyFormatter,
    domain::{
        Category, EntityId, MonthKey, ReminderType, SubscriptionDraft, SubscriptionPatch,
        TransactionDraft, TransactionKind, TransactionPatch, ISO_DATE_FORMAT,
    },
    init,
    storage::JsonStorage,
    ReminderService, SummaryService,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Pins "today" to a `YYYY-MM-DD` date, for scripted runs.
const TODAY_ENV: &str = "MONI_TODAY";

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("{} {err}", "Error:".red().bold());
        process::exit(1);
    }
}

struct Session {
    store: DataStore,
    config: Config,
    base: PathBuf,
    clock: Box<dyn Clock>,
}

impl Session {
    fn open() -> CliResult<Self> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        let base = manager.base_dir().to_path_buf();
        let storage = JsonStorage::new(Some(config.data_dir_in(&base)))?;
        let store = DataStore::open(Box::new(storage), config.storage_key.clone());
        if let LoadOutcome::Recovered(reason) = store.load_outcome() {
            eprintln!(
                "{} stored data could not be read ({reason}); starting empty",
                "Warning:".yellow().bold()
            );
        }
        Ok(Self {
            store,
            config,
            base,
            clock: session_clock()?,
        })
    }

    fn formatter(&self) -> CurrencyFormatter {
        self.config.formatter()
    }

    /// Surfaces a swallowed persistence failure from the last mutation.
    fn check_saved(&self) -> CliResult<()> {
        match self.store.last_save_error() {
            Some(err) => Err(format!("changes were not saved: {err}").into()),
            None => Ok(()),
        }
    }
}

fn session_clock() -> CliResult<Box<dyn Clock>> {
    match env::var(TODAY_ENV) {
        Ok(raw) => {
            let date = NaiveDate::parse_from_str(&raw, ISO_DATE_FORMAT)
                .map_err(|_| format!("{TODAY_ENV} must be a YYYY-MM-DD date, got `{raw}`"))?;
            Ok(Box::new(FixedClock::on(date)))
        }
        Err(_) => Ok(Box::new(SystemClock)),
    }
}

fn run() -> CliResult<()> {
    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_else(|| usage_exit());
    let rest: Vec<String> = args.collect();

    let mut session = Session::open()?;
    match command.as_str() {
        "summary" => summary(&session, rest.first()),
        "reminders" => reminders(&session),
        "list" => list(&session, rest.first()),
        "add" => {
            let [kind, amount, category, date, ..] = rest.as_slice() else {
                usage_exit()
            };
            let kind = TransactionKind::parse(kind)
                .ok_or_else(|| format!("unknown transaction type `{kind}`"))?;
            let mut draft =
                TransactionDraft::new(kind, amount.parse()?, category.as_str(), date.as_str());
            if rest.len() > 4 {
                draft = draft.with_description(rest[4..].join(" "));
            }
            let id = session.store.add_transaction(draft)?;
            session.check_saved()?;
            success(&format!("Added transaction {id}"));
            Ok(())
        }
        "add-subscription" => {
            let [name, amount, category, day, ..] = rest.as_slice() else {
                usage_exit()
            };
            let mut draft =
                SubscriptionDraft::new(name.as_str(), amount.parse()?, category.as_str(), day.parse()?);
            let reminder = match rest.get(4) {
                Some(raw) => ReminderType::parse(raw)
                    .ok_or_else(|| format!("unknown reminder type `{raw}`"))?,
                None => ReminderType::None,
            };
            draft = match reminder {
                ReminderType::None => draft,
                ReminderType::Cancel => draft.with_cancel_reminder(),
                ReminderType::Payment => {
                    let days = rest.get(5).map(|raw| raw.parse::<u32>()).transpose()?;
                    draft.with_payment_reminder(days)
                }
            };
            let id = session.store.add_subscription(draft)?;
            session.check_saved()?;
            success(&format!("Added subscription {id}"));
            Ok(())
        }
        "toggle" => {
            let id = required_id(&rest);
            if !session.store.toggle_subscription(&id) {
                return Err(format!("no subscription with id `{id}`").into());
            }
            session.check_saved()?;
            let active = session
                .store
                .get()
                .subscription(&id)
                .map(|sub| sub.active)
                .unwrap_or_default();
            success(&format!(
                "Subscription {id} is now {}",
                if active { "active" } else { "paused" }
            ));
            Ok(())
        }
        "edit-transaction" => {
            let id = required_id(&rest);
            if session.store.get().transaction(&id).is_none() {
                return Err(format!("no transaction with id `{id}`").into());
            }
            let patch = transaction_patch(&rest[1..])?;
            if !session.store.edit_transaction(&id, patch) {
                return Err(format!("invalid values for transaction `{id}`").into());
            }
            session.check_saved()?;
            success(&format!("Updated transaction {id}"));
            Ok(())
        }
        "edit-subscription" => {
            let id = required_id(&rest);
            if session.store.get().subscription(&id).is_none() {
                return Err(format!("no subscription with id `{id}`").into());
            }
            let patch = subscription_patch(&rest[1..])?;
            if !session.store.edit_subscription(&id, patch) {
                return Err(format!("invalid values for subscription `{id}`").into());
            }
            session.check_saved()?;
            success(&format!("Updated subscription {id}"));
            Ok(())
        }
        "delete-transaction" => {
            let id = required_id(&rest);
            if session.store.delete_transaction(&id) {
                session.check_saved()?;
                success(&format!("Deleted transaction {id}"));
            } else {
                println!("No transaction with id {id}; nothing to delete.");
            }
            Ok(())
        }
        "delete-subscription" => {
            let id = required_id(&rest);
            if session.store.delete_subscription(&id) {
                session.check_saved()?;
                success(&format!("Deleted subscription {id}"));
            } else {
                println!("No subscription with id {id}; nothing to delete.");
            }
            Ok(())
        }
        "export" => {
            let dir = rest
                .first()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathResolver::export_dir_in(&session.base));
            let path = session.store.export_to_dir(&dir, session.clock.today())?;
            success(&format!("Exported to {}", path.display()));
            Ok(())
        }
        "import" => {
            let path = rest.first().map(PathBuf::from).unwrap_or_else(|| usage_exit());
            let text = fs::read_to_string(&path)?;
            let summary = session.store.import_data(&text)?;
            session.check_saved()?;
            success(&summary.message);
            Ok(())
        }
        "clear" => {
            if rest.first().map(String::as_str) != Some("--yes") {
                return Err("refusing to delete all data without --yes".into());
            }
            session.store.clear_all(ClearConfirmation::confirmed());
            session.check_saved()?;
            success("All data deleted");
            Ok(())
        }
        "set-key" => {
            let key = rest.first().cloned().unwrap_or_else(|| usage_exit());
            session.store.set_credential(Some(key));
            session.check_saved()?;
            success("Advisor API key saved");
            Ok(())
        }
        "analysis" => {
            match &session.store.get().analysis {
                Some(analysis) => {
                    println!(
                        "{}",
                        format!(
                            "Analysis from {}",
                            analysis.created_at.format("%Y-%m-%d %H:%M UTC")
                        )
                        .bold()
                    );
                    println!("{}", analysis.text);
                }
                None => println!("No analysis saved yet."),
            }
            Ok(())
        }
        "prompt" => {
            let month = MonthKey::from_date(session.clock.today());
            let data = session.store.get();
            let summary = SummaryService::compute_summary(data, &month);
            println!("{}", build_prompt(&summary, &data.subscriptions, &session.formatter()));
            Ok(())
        }
        _ => usage_exit(),
    }
}

fn summary(session: &Session, month: Option<&String>) -> CliResult<()> {
    let month = resolve_month(session, month)?;
    let summary = SummaryService::compute_summary(session.store.get(), &month);
    let fmt = session.formatter();

    println!("{}", format!("Summary for {}", summary.month).bold());
    println!("  Income:        {}", fmt.format(summary.income).green());
    println!("  Expenses:      {}", fmt.format(summary.expense_from_transactions));
    println!("  Subscriptions: {}", fmt.format(summary.subscriptions_total));
    println!("  Total expense: {}", fmt.format(summary.total_expense).red());
    let balance = fmt.format(summary.balance);
    if summary.balance < 0.0 {
        println!("  Balance:       {}", balance.red().bold());
    } else {
        println!("  Balance:       {}", balance.green().bold());
    }
    if !summary.category_breakdown.is_empty() {
        println!("{}", "By category".bold());
        for entry in &summary.category_breakdown {
            println!("  {:<24} {}", entry.group, fmt.format(entry.amount));
        }
    }
    Ok(())
}

fn reminders(session: &Session) -> CliResult<()> {
    let alerts =
        ReminderService::compute_reminders(&session.store.get().subscriptions, session.clock.today());
    if alerts.is_empty() {
        println!("No upcoming reminders.");
        return Ok(());
    }
    let fmt = session.formatter();
    for alert in alerts {
        let line = alert.describe(&fmt);
        if alert.is_due_today() {
            println!("{}", line.red().bold());
        } else {
            println!("{}", line.yellow());
        }
    }
    Ok(())
}

fn list(session: &Session, month: Option<&String>) -> CliResult<()> {
    let data = session.store.get();
    let fmt = session.formatter();
    let transactions = match month {
        Some(raw) => SummaryService::month_transactions(data, &MonthKey::parse(raw)?),
        None => data.transactions.iter().collect(),
    };

    println!("{}", "Transactions".bold());
    if transactions.is_empty() {
        println!("  (none)");
    }
    for txn in transactions {
        let amount = fmt.format(txn.amount);
        let amount = match txn.kind {
            TransactionKind::Income => format!("+{amount}").green(),
            TransactionKind::Expense => format!("-{amount}").red(),
        };
        println!(
            "  {}  {}  {:<28} {}  {}",
            txn.id.as_str().dimmed(),
            txn.date,
            txn.category.to_string(),
            amount,
            txn.description
        );
    }

    println!("{}", "Subscriptions".bold());
    if data.subscriptions.is_empty() {
        println!("  (none)");
    }
    for sub in &data.subscriptions {
        let state = if sub.active { "active".green() } else { "paused".dimmed() };
        println!(
            "  {}  {:<20} {}  day {:>2}  {}  reminder: {}",
            sub.id.as_str().dimmed(),
            sub.name,
            fmt.format(sub.amount),
            sub.billing_day,
            state,
            sub.reminder()
        );
    }
    Ok(())
}

/// Parses `field=value` pairs into a transaction patch.
fn transaction_patch(pairs: &[String]) -> CliResult<TransactionPatch> {
    let mut patch = TransactionPatch::default();
    for (field, value) in field_values(pairs)? {
        match field {
            "type" => {
                patch.kind = Some(
                    TransactionKind::parse(value)
                        .ok_or_else(|| format!("unknown transaction type `{value}`"))?,
                )
            }
            "amount" => patch.amount = Some(value.parse()?),
            "category" => patch.category = Some(Category::parse(value)),
            "description" => patch.description = Some(value.to_string()),
            "date" => patch.date = Some(value.to_string()),
            other => return Err(format!("unknown transaction field `{other}`").into()),
        }
    }
    Ok(patch)
}

/// Parses `field=value` pairs into a subscription patch. `days=none` clears
/// the payment reminder threshold.
fn subscription_patch(pairs: &[String]) -> CliResult<SubscriptionPatch> {
    let mut patch = SubscriptionPatch::default();
    for (field, value) in field_values(pairs)? {
        match field {
            "name" => patch.name = Some(value.to_string()),
            "amount" => patch.amount = Some(value.parse()?),
            "category" => patch.category = Some(Category::parse(value)),
            "day" => patch.billing_day = Some(value.parse()?),
            "reminder" => {
                patch.reminder_type = Some(
                    ReminderType::parse(value)
                        .ok_or_else(|| format!("unknown reminder type `{value}`"))?,
                )
            }
            "days" if value == "none" => patch.reminder_days = Some(None),
            "days" => patch.reminder_days = Some(Some(value.parse()?)),
            other => return Err(format!("unknown subscription field `{other}`").into()),
        }
    }
    Ok(patch)
}

fn field_values(pairs: &[String]) -> CliResult<Vec<(&str, &str)>> {
    if pairs.is_empty() {
        usage_exit();
    }
    let mut fields = Vec::with_capacity(pairs.len());
    for pair in pairs {
        match pair.split_once('=') {
            Some(field) => fields.push(field),
            None => return Err(format!("expected field=value, got `{pair}`").into()),
        }
    }
    Ok(fields)
}

fn resolve_month(session: &Session, raw: Option<&String>) -> CliResult<MonthKey> {
    Ok(match raw {
        Some(value) => MonthKey::parse(value)?,
        None => MonthKey::from_date(session.clock.today()),
    })
}

fn required_id(rest: &[String]) -> EntityId {
    match rest.first() {
        Some(raw) => EntityId::from(raw.as_str()),
        None => usage_exit(),
    }
}

fn success(message: &str) {
    println!("{}", message.green());
}

fn usage_exit() -> ! {
    print_usage();
    process::exit(1);
}

fn print_usage() {
    eprintln!(
        "Usage: moni_cli <command>\n\
         Commands:\n  \
         summary [YYYY-MM]\n  \
         reminders\n  \
         list [YYYY-MM]\n  \
         add <income|expense> <amount> <category> <YYYY-MM-DD> [description]\n  \
         add-subscription <name> <amount> <category> <day> [none|payment|cancel] [days]\n  \
         toggle <subscription-id>\n  \
         edit-transaction <id> <field=value>... (type, amount, category, date, description)\n  \
         edit-subscription <id> <field=value>... (name, amount, category, day, reminder, days)\n  \
         delete-transaction <id>\n  \
         delete-subscription <id>\n  \
         export [dir]\n  \
         import <file.json>\n  \
         clear --yes\n  \
         set-key <api-key>\n  \
         analysis\n  \
         prompt"
    );
}
