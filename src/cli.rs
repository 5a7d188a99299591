//! REPL 输入解析：内置命令与强制指定 Agent 的前缀

use crate::agents::AgentKind;

/// 可作为前缀强制指定 Agent 的词（"auto" 表示自动路由）
const PREFIXES: &[(&str, Option<AgentKind>)] = &[
    ("auto", None),
    ("concept", Some(AgentKind::Concept)),
    ("coding", Some(AgentKind::Coding)),
    ("math", Some(AgentKind::Math)),
    ("executor", Some(AgentKind::Math)),
    ("research", Some(AgentKind::Research)),
    ("planner", Some(AgentKind::Planner)),
    ("multi", Some(AgentKind::MultiAgent)),
    ("answerer", Some(AgentKind::Answerer)),
];

/// 一行输入对应的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Usage,
    /// 空行，或只有前缀没有内容
    Empty,
    Query {
        text: String,
        agent: Option<AgentKind>,
    },
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => return Command::Empty,
        "exit" | "quit" => return Command::Exit,
        "help" => return Command::Help,
        "usage" => return Command::Usage,
        _ => {}
    }

    let (first, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let first = first.to_lowercase();
    if let Some((_, agent)) = PREFIXES.iter().find(|(p, _)| *p == first) {
        let text = rest.trim();
        // 单独一个前缀词本身就是查询内容
        if text.is_empty() {
            return Command::Query {
                text: line.to_string(),
                agent: None,
            };
        }
        return Command::Query {
            text: text.to_string(),
            agent: *agent,
        };
    }

    Command::Query {
        text: line.to_string(),
        agent: None,
    }
}

pub fn help_text() -> String {
    let mut out = String::from(
        "Available commands:\n  exit - Exit the application\n  help - Show this help message\n  usage - Show usage statistics\n  auto <query> - Pick the agent automatically\n",
    );
    for kind in AgentKind::ALL {
        out.push_str(&format!("  {} <query> - {}\n", kind, kind.description()));
    }
    out.push_str("  executor <query> - Same as math\n");
    out
}
