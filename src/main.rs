//! Gushi - AI 股票分析客户端（命令行前端）
//!
//! 入口：初始化日志与配置，创建会话引擎与任务提交器，运行行式交互循环。
//! 自由文本直接作为查询提交；以 `/` 开头的输入是命令：
//! /history /tasks /batch <代码...> /scan /cancel <id> /detail <id> /quit

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use gushi::config::load_config;
use gushi::gateway::api::{AnalysisKind, TaskPriority};
use gushi::gateway::HttpGateway;
use gushi::{ConversationEngine, TaskSubmitter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gushi::observability::init();

    let cfg = load_config(None).unwrap_or_default();
    let gateway =
        Arc::new(HttpGateway::new(&cfg.service).context("Failed to build HTTP gateway")?);

    let mut engine = ConversationEngine::new(gateway.clone(), &cfg.chat);
    let mut submitter = TaskSubmitter::new(gateway, &cfg.tasks);

    println!("Gushi - AI 股票分析助手 (会话 {})", engine.session_id());
    for msg in engine.messages() {
        println!("[AI] {}", msg.content);
        for s in &msg.suggestions {
            println!("  提示: {}", s);
        }
    }

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,

            ("/history", _) => match engine.load_history().await {
                Ok(count) => println!("已加载 {} 条历史消息", count),
                Err(e) => eprintln!("加载历史失败: {}", e),
            },

            ("/tasks", _) => match submitter.refresh().await {
                Ok(_) => {
                    for task in submitter.registry().tasks() {
                        println!(
                            "{}  {}  {}  {}%",
                            task.task_id, task.task_type, task.status, task.progress
                        );
                    }
                }
                Err(e) => eprintln!("获取任务列表失败: {}", e),
            },

            ("/batch", symbols) => {
                let kinds = [AnalysisKind::Technical, AnalysisKind::Fundamental];
                match submitter
                    .create_batch_analysis(symbols, &kinds, TaskPriority::Normal)
                    .await
                {
                    Ok(task_id) => println!("批量分析任务已创建: {}", task_id),
                    Err(e) => eprintln!("创建任务失败: {}", e),
                }
            }

            ("/scan", _) => match submitter.create_market_scan().await {
                Ok(task_id) => println!("市场扫描任务已创建: {}", task_id),
                Err(e) => eprintln!("创建扫描任务失败: {}", e),
            },

            ("/cancel", task_id) => match submitter.cancel(task_id.trim()).await {
                Ok(true) => println!("任务已请求取消"),
                Ok(false) => println!("任务当前状态不可取消"),
                Err(e) => eprintln!("取消任务失败: {}", e),
            },

            ("/detail", task_id) => match submitter.fetch_detail(task_id.trim()).await {
                Ok(detail) => {
                    println!(
                        "{}  {}  {}  {}%",
                        detail.task_id, detail.task_type, detail.status, detail.progress
                    );
                    println!("股票: {}", detail.symbols.join(", "));
                    if let Some(result) = &detail.result {
                        println!("结果: {}", result);
                    }
                    if let Some(err) = &detail.error_message {
                        println!("错误: {}", err);
                    }
                }
                Err(e) => eprintln!("获取任务详情失败: {}", e),
            },

            _ => {
                // 查询期间调用方应禁用输入；行式循环天然满足这一约定
                if let Err(e) = engine.submit(line).await {
                    eprintln!("发送消息失败: {}", e);
                }
                if let Some(last) = engine.messages().last() {
                    println!("[AI] {}", last.content);
                    for rec in &last.recommendations {
                        println!("  {} {} {}", rec.symbol, rec.rationale, rec.action);
                    }
                }
            }
        }
    }

    Ok(())
}
