mod mcp_integration;
